use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub editions_collection: String,
    pub quizzes_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub default_question_count: usize,
    pub max_question_count: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "eurovision".to_string()),
            editions_collection: env::var("EDITIONS_COLLECTION")
                .unwrap_or_else(|_| "festivales".to_string()),
            quizzes_collection: env::var("QUIZZES_COLLECTION")
                .unwrap_or_else(|_| "quizzes".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            default_question_count: env::var("DEFAULT_QUESTION_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10),
            max_question_count: env::var("MAX_QUESTION_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(50),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
            mongo_db_name: "eurovision-test".to_string(),
            editions_collection: "festivales".to_string(),
            quizzes_collection: "quizzes".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            default_question_count: 10,
            max_question_count: 50,
        }
    }
}
