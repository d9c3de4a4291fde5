use redis_lite::{
    commands::{CommandError, CommandHandler, CommandResult, ConnectionKind},
    resp::RespValue,
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_unknown_command() {
    let env = TestEnv::new_master_server();

    env.exec_command_err(
        TestUtils::command(&["Flushall"]),
        &TestUtils::client_address(41844),
        CommandError::UnknownCommand("Flushall".to_string()),
    )
    .await;
}

#[tokio::test]
async fn test_execute_turns_errors_into_replies() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        (
            TestUtils::command(&["FOO"]),
            RespValue::Error("ERR unknown command 'FOO'".to_string()),
        ),
        (
            RespValue::SimpleString("PING".to_string()),
            CommandError::InvalidCommand.as_resp(),
        ),
        (
            RespValue::Array(vec![
                RespValue::BulkString("ECHO".to_string()),
                RespValue::Integer(1),
            ]),
            CommandError::InvalidCommandArgument.as_resp(),
        ),
        (
            TestUtils::command(&["GET"]),
            RespValue::Error("ERR wrong number of arguments for 'get' command".to_string()),
        ),
    ];

    for (input, expected) in test_cases {
        let result = CommandHandler::execute(
            input,
            &env.context,
            &TestUtils::client_address(41844),
            ConnectionKind::Client,
        )
        .await;

        assert_eq!(result, CommandResult::Response(expected));
    }
}

#[test]
fn test_command_names_are_case_insensitive() {
    for name in ["echo", "ECHO", "Echo"] {
        let handler = CommandHandler::new(TestUtils::command(&[name, "hi"])).unwrap();
        assert_eq!(handler.name, "ECHO");
    }
}
