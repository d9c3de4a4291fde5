use redis_lite::resp::RespValue;

#[test]
fn test_parse_nested_array_consumes_exact_length() {
    let input = b"*2\r\n*1\r\n+OK\r\n:123\r\n";

    let (value, consumed) = RespValue::parse(input).unwrap();

    assert_eq!(
        value,
        RespValue::Array(vec![
            RespValue::Array(vec![RespValue::SimpleString("OK".to_string())]),
            RespValue::Integer(123),
        ])
    );
    assert_eq!(consumed, input.len());
}

#[test]
fn test_parse_reports_consumed_bytes_of_first_value_only() {
    let input = b"*2\r\n$4\r\nECHO\r\n$3\r\nhey\r\n+PONG\r\n";

    let (value, consumed) = RespValue::parse(input).unwrap();

    assert_eq!(value, RespValue::bulk_string_array(&["ECHO", "hey"]));
    assert_eq!(consumed, 23);
    assert_eq!(&input[consumed..], b"+PONG\r\n");
}

#[test]
fn test_round_trip() {
    let test_cases = vec![
        RespValue::SimpleString("OK".to_string()),
        RespValue::Error("ERR unknown command 'FOO'".to_string()),
        RespValue::Integer(-42),
        RespValue::BulkString("hello world".to_string()),
        RespValue::BulkString(String::new()),
        RespValue::NullBulkString,
        RespValue::Array(vec![]),
        RespValue::Array(vec![
            RespValue::BulkString("SET".to_string()),
            RespValue::Array(vec![RespValue::Integer(1), RespValue::NullBulkString]),
            RespValue::SimpleString("done".to_string()),
        ]),
    ];

    for value in test_cases {
        let encoded = value.encode();
        let (decoded, consumed) = RespValue::parse(&encoded).unwrap();

        assert_eq!(decoded, value);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn test_encode_wire_format() {
    let test_cases = vec![
        (RespValue::SimpleString("PONG".to_string()), "+PONG\r\n"),
        (RespValue::Error("ERR oops".to_string()), "-ERR oops\r\n"),
        (RespValue::Integer(1000), ":1000\r\n"),
        (RespValue::BulkString("bar".to_string()), "$3\r\nbar\r\n"),
        (RespValue::NullBulkString, "$-1\r\n"),
        (
            RespValue::bulk_string_array(&["SET", "foo", "bar"]),
            "*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n",
        ),
    ];

    for (value, expected) in test_cases {
        assert_eq!(&value.encode()[..], expected.as_bytes());
    }
}

#[test]
fn test_parse_incomplete_input() {
    let test_cases: Vec<&[u8]> = vec![
        &b""[..],
        &b"+OK"[..],
        &b"$5\r\nhel"[..],
        &b"$5\r\nhello"[..],
        &b"*2\r\n$3\r\nfoo\r\n"[..],
        &b"*2\r\n*1\r\n+OK\r\n"[..],
    ];

    for input in test_cases {
        let error = RespValue::parse(input).unwrap_err();
        assert!(error.is_incomplete(), "{:?} gave {:?}", input, error);
    }
}
