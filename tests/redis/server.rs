use redis_lite::server::{generate_replication_id, CliError, RedisRole, RedisServer};

#[test]
fn test_redis_server_creation_without_flags() {
    let args = vec!["redis-lite".to_string()];

    let server = RedisServer::new(args).unwrap();
    assert_eq!(server.port, 6379);
    assert_eq!(server.role, RedisRole::Master);
    assert_eq!(server.repl_offset, 0);
    assert_eq!(server.repl_id.len(), 40);
}

#[test]
fn test_redis_server_creation_with_invalid_flags() {
    let test_cases = vec![
        (
            vec!["redis-lite", "--port", "invalid"],
            CliError::InvalidCommandLineFlagValue,
        ),
        (
            vec!["redis-lite", "--port", "70000"],
            CliError::InvalidCommandLineFlagValue,
        ),
        (
            vec!["redis-lite", "--port", "0"],
            CliError::InvalidCommandLineFlagValue,
        ),
        (vec!["redis-lite", "--port"], CliError::InvalidCommandLineFlagValue),
        (vec!["redis-lite", "--unknown"], CliError::InvalidCommandLineFlag),
        (
            vec!["redis-lite", "--replicaof", "localhost"],
            CliError::InvalidCommandLineFlagValue,
        ),
        (
            vec!["redis-lite", "--replicaof", "localhost port"],
            CliError::InvalidCommandLineFlagValue,
        ),
        (
            vec!["redis-lite", "--replicaof", "localhost 6379 extra"],
            CliError::InvalidCommandLineFlagValue,
        ),
    ];

    for (args, expected_error) in test_cases {
        let args: Vec<String> = args.into_iter().map(str::to_string).collect();
        let result = RedisServer::new(args.clone());
        assert_eq!(result.unwrap_err(), expected_error, "args: {:?}", args);
    }
}

#[test]
fn test_redis_server_creation_with_port_flag() {
    let args = vec![
        "redis-lite".to_string(),
        "--port".to_string(),
        "6677".to_string(),
    ];

    let server = RedisServer::new(args).unwrap();
    assert_eq!(server.port, 6677);
    assert!(server.is_master());
}

#[test]
fn test_redis_server_creation_with_replicaof_flag() {
    let args = vec![
        "redis-lite".to_string(),
        "--port".to_string(),
        "6380".to_string(),
        "--replicaof".to_string(),
        "localhost 6379".to_string(),
    ];

    let server = RedisServer::new(args).unwrap();
    assert_eq!(server.port, 6380);
    assert_eq!(
        server.role,
        RedisRole::Replica {
            host: "localhost".to_string(),
            port: 6379,
        }
    );
    assert_eq!(server.role.as_str(), "slave");
    assert!(!server.is_master());
}

#[test]
fn test_help_flag_returns_usage() {
    let result = RedisServer::new(vec!["redis-lite".to_string(), "--help".to_string()]);

    let Err(CliError::Usage(usage)) = result else {
        panic!("Expected usage, got {:?}", result.map(|server| server.port));
    };

    assert!(usage.contains("--replicaof"));
}

#[test]
fn test_generate_replication_id() {
    let first = generate_replication_id();
    let second = generate_replication_id();

    assert_eq!(first.len(), 40);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first, second);
}
