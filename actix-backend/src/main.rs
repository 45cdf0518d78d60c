use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use clap::{Parser, Subcommand};
use snippet_backend::{
    config::Config,
    identity::{issue_token, JwtIdentityProvider},
    middleware::jwt_middleware::RequireIdentity,
    open_store, routes, AppState,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "snippet-backend", about = "Snippet service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a one-day development token for the given user and exit.
    Token { user_id: Uuid },
}

fn print_dev_token(user_id: Uuid) -> io::Result<()> {
    let secret = Config::jwt_secret_from_env().map_err(io::Error::other)?;
    let token = issue_token(&secret, user_id, chrono::Duration::hours(24)).map_err(io::Error::other)?;
    println!("{token}");
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Some(Command::Token { user_id }) = Cli::parse().command {
        return print_dev_token(user_id);
    }

    let config = Config::from_env().map_err(io::Error::other)?;
    let store = open_store(&config.storage).await.map_err(io::Error::other)?;
    let app_data = Data::new(AppState::new(store));
    let identity = RequireIdentity::new(Arc::new(JwtIdentityProvider::new(&config.jwt_access_secret)));

    log::info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(app_data.clone())
            .app_data(routes::snippet_routes::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(|cfg| routes::snippet_routes::config(cfg, identity.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_subcommand_takes_a_uuid() {
        let user_id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["snippet-backend", "token", &user_id.to_string()]).unwrap();
        assert!(matches!(cli.command, Some(Command::Token { user_id: parsed }) if parsed == user_id));

        assert!(Cli::try_parse_from(["snippet-backend", "token", "alice"]).is_err());
        assert!(Cli::try_parse_from(["snippet-backend"]).unwrap().command.is_none());
    }
}
