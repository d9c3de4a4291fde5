use redis_lite::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_replconf_command() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        TestUtils::replconf_listening_port_command(6380),
        TestUtils::replconf_capa_command(),
        TestUtils::command(&["REPLCONF", "capa", "eof", "capa", "psync2"]),
        TestUtils::command(&["replconf", "LISTENING-PORT", "6381"]),
    ];

    for command in test_cases {
        env.exec_command_ok(
            command,
            &TestUtils::client_address(41844),
            TestUtils::expected_simple_string("OK"),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_replconf_listening_port_registers_pending_replica() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(41844);

    env.exec_command_ok(
        TestUtils::replconf_listening_port_command(6380),
        &client_address,
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    let server_guard = env.context.server.read().await;
    let replica = server_guard.replicas.get(&client_address).unwrap();
    assert_eq!(replica.listening_port, Some(6380));
    assert!(!replica.is_attached());
    assert_eq!(server_guard.replicas.connected_replicas(), 0);
}

#[tokio::test]
async fn test_handle_replconf_on_replica_does_not_register() {
    let env = TestEnv::new_replica_server(6380);
    let client_address = TestUtils::client_address(41844);

    env.exec_command_ok(
        TestUtils::replconf_listening_port_command(6381),
        &client_address,
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    let server_guard = env.context.server.read().await;
    assert!(server_guard.replicas.get(&client_address).is_none());
}

#[tokio::test]
async fn test_handle_replconf_command_invalid() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        TestUtils::command(&["REPLCONF"]),
        TestUtils::command(&["REPLCONF", "capa"]),
        TestUtils::command(&["REPLCONF", "capa", "psync2", "listening-port"]),
        TestUtils::command(&["REPLCONF", "listening-port", "invalid"]),
        TestUtils::command(&["REPLCONF", "listening-port", "70000"]),
        TestUtils::command(&["REPLCONF", "listening-port", "0"]),
    ];

    for command in test_cases {
        env.exec_command_err(
            command,
            &TestUtils::client_address(41844),
            CommandError::InvalidReplconfCommand,
        )
        .await;
    }
}
