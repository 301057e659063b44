use crate::db::OrmConn;
use crate::token::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub tokens: TokenService,
}
