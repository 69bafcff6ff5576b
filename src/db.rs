use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tokio::net::lookup_host;

fn redact_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let Some((userinfo, hostport)) = authority.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{hostport}{path}"),
        None => url.to_string(),
    }
}

fn extract_host_port(url: &str) -> Option<(String, u16)> {
    let after_scheme = url.split("://").nth(1)?;
    let authority = after_scheme.split('/').next().unwrap_or(after_scheme);
    let hostport = authority.rsplit('@').next().unwrap_or(authority);
    let mut parts = hostport.split(':');
    let host = parts.next()?.to_string();
    if host.is_empty() {
        return None;
    }
    let port = parts
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5432);
    Some((host, port))
}

pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    tracing::info!(database_url = %redact_db_url(url), "connecting to database");

    if url.starts_with("postgres") {
        if let Some((host, port)) = extract_host_port(url) {
            match lookup_host((host.as_str(), port)).await {
                Ok(addrs) => {
                    let list: Vec<String> = addrs.map(|addr| addr.to_string()).collect();
                    tracing::debug!(%host, port, ?list, "resolved database host");
                }
                Err(err) => {
                    tracing::warn!(%host, port, error = %err, "database host lookup failed");
                }
            }
        }
    }

    let mut options = ConnectOptions::new(url.to_string());
    options.sqlx_logging(false);
    if url.starts_with("sqlite") {
        // every pooled connection to an in-memory database is a separate database
        options.max_connections(1);
    }
    Database::connect(options).await
}
