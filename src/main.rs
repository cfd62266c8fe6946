use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use eurovision_trivia::{
    app_state::AppState,
    config::Config,
    graphql::{create_schema, graphiql, graphql_handler},
    handlers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config).await.map_err(|err| {
        log::error!("Failed to initialise application state: {}", err);
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;
    let schema = create_schema(state.clone());
    let state = web::Data::new(std::sync::Arc::new(state));
    let schema = web::Data::new(schema);

    log::info!("Starting HTTP server on http://{}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(schema.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(handlers::configure)
            .route("/graphql", web::post().to(graphql_handler))
            .route("/graphiql", web::get().to(graphiql))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
