use redis_lite::{
    commands::{CommandError, CommandResult, ConnectionKind},
    resp::RespValue,
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_set_command() {
    let env = TestEnv::new_master_server();

    env.exec_command_ok(
        TestUtils::set_command("grape", "mango"),
        &TestUtils::client_address(41844),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    assert_eq!(env.get_value("grape").await, Some("mango".to_string()));

    let store_guard = env.context.store.lock().await;
    let value = store_guard.peek("grape").unwrap();
    assert!(value.expiration.is_none());
}

#[tokio::test]
async fn test_handle_set_command_overwrites_value() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(41844);

    for value in ["mango", "pear"] {
        env.exec_command_ok(
            TestUtils::set_command("grape", value),
            &client_address,
            TestUtils::expected_simple_string("OK"),
        )
        .await;
    }

    assert_eq!(env.get_value("grape").await, Some("pear".to_string()));
}

#[tokio::test]
async fn test_handle_set_command_with_expiration() {
    let env = TestEnv::new_master_server();

    env.exec_command_ok(
        TestUtils::command(&["SET", "grape", "mango", "px", "100"]),
        &TestUtils::client_address(41844),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    let store_guard = env.context.store.lock().await;
    let value = store_guard.peek("grape").unwrap();
    assert_eq!(value.data, "mango");
    assert!(value.expiration.is_some());
}

#[tokio::test]
async fn test_handle_set_command_invalid() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        (
            TestUtils::command(&["SET", "grape"]),
            CommandError::InvalidSetCommand,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "px"]),
            CommandError::InvalidSetCommandArgument,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "ex", "10"]),
            CommandError::InvalidSetCommandArgument,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "px", "10", "px", "20"]),
            CommandError::InvalidSetCommandArgument,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "px", "abc"]),
            CommandError::InvalidSetCommandExpiration,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "px", "0"]),
            CommandError::InvalidSetCommandExpiration,
        ),
        (
            TestUtils::command(&["SET", "grape", "mango", "px", "-5"]),
            CommandError::InvalidSetCommandExpiration,
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, &TestUtils::client_address(41844), expected_error)
            .await;
    }

    assert_eq!(env.get_value("grape").await, None);
}

#[tokio::test]
async fn test_handle_set_command_advances_master_offset() {
    let env = TestEnv::new_master_server();
    let command = TestUtils::set_command("foo", "bar");
    let encoded_length = command.encode().len() as u64;

    env.exec_command_ok(
        command,
        &TestUtils::client_address(41844),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    assert_eq!(env.repl_offset().await, encoded_length);
}

#[tokio::test]
async fn test_handle_set_command_rejected_from_replica_client() {
    let env = TestEnv::new_replica_server(6380);

    env.exec_command_err(
        TestUtils::set_command("foo", "bar"),
        &TestUtils::client_address(41844),
        CommandError::ReplicaReadOnlyCommands,
    )
    .await;

    assert_eq!(env.get_value("foo").await, None);
}

#[tokio::test]
async fn test_handle_set_command_applied_from_master_stream() {
    let env = TestEnv::new_replica_server(6380);

    let result = env
        .exec_command_as(
            TestUtils::set_command("foo", "bar"),
            "127.0.0.1:6379",
            ConnectionKind::Master,
        )
        .await;

    assert_eq!(
        result,
        Ok(CommandResult::Response(RespValue::SimpleString(
            "OK".to_string()
        )))
    );
    assert_eq!(env.get_value("foo").await, Some("bar".to_string()));
    // The offset on a replica is advanced by the connection layer, not here.
    assert_eq!(env.repl_offset().await, 0);
}
