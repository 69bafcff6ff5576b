#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,

    pub jwt_secret: Option<String>,
    pub jwt_ttl_seconds: u64,

    // Federated login is rejected until a client id is configured.
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,

    pub broadcast_base_url: String,
    pub broadcast_timeout_seconds: u64,
    pub broadcast_user_agent: String,
}
