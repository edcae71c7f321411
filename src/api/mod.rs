use actix_web::web;
mod handlers;
mod transaction_handlers;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(handlers::list_networks)
            .service(handlers::get_wallet)
            .service(handlers::get_selection)
            .service(handlers::select_network)
            .service(handlers::use_custom_contract)
            .service(handlers::use_default_contract)
            .service(handlers::get_token)
            .service(handlers::refresh_token)
            .service(handlers::check_balance)
            .service(handlers::check_allowance)
            .service(transaction_handlers::submit_transaction)
            .service(transaction_handlers::get_status),
    );
}
