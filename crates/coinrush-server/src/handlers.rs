//! Route handlers and their wire types.
//!
//! Field names mirror the original client contract (camelCase, `ETH`
//! suffixes). Wallet addresses arrive as raw strings and are parsed here so
//! invalid input never reaches the repository.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use coinrush_core::{Account, LeaderboardRow, ScoreEntry, WalletAddress};
use coinrush_service::ProvisionRequest;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetupBody {
    wallet_address: String,
    parent_wallet_address: Option<String>,
    username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountQuery {
    wallet_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsernameBody {
    wallet_address: String,
    new_username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpendBody {
    wallet_address: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreBody {
    wallet_address: String,
    score: u64,
    user_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreResponse {
    entry: ScoreEntry,
    account: Account,
    is_new_personal_best: bool,
}

pub(crate) async fn health_check() -> &'static str {
    "ok"
}

pub(crate) async fn setup_account(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetupBody>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .provisioner
        .provision(ProvisionRequest {
            wallet_address: body.wallet_address,
            parent_wallet_address: body.parent_wallet_address,
            username: body.username,
        })
        .await?;
    Ok(Json(account))
}

pub(crate) async fn update_username(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UsernameBody>,
) -> Result<Json<Account>, ApiError> {
    let wallet = WalletAddress::parse(&body.wallet_address)?;
    let account = state
        .provisioner
        .update_username(&wallet, &body.new_username)
        .await?;
    Ok(Json(account))
}

pub(crate) async fn get_account(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<Account>, ApiError> {
    let wallet = WalletAddress::parse(&query.wallet_address)?;
    let account = state.allowance.fetch_account(&wallet).await?;
    Ok(Json(account))
}

pub(crate) async fn record_spend(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SpendBody>,
) -> Result<Json<Account>, ApiError> {
    let wallet = WalletAddress::parse(&body.wallet_address)?;
    let outcome = state.allowance.try_spend(&wallet, body.amount).await?;
    Ok(Json(outcome.account))
}

pub(crate) async fn submit_score(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ScoreBody>,
) -> Result<(StatusCode, Json<ScoreResponse>), ApiError> {
    let wallet = WalletAddress::parse(&body.wallet_address)?;
    let submission = state
        .ledger
        .submit(&wallet, body.score, &body.user_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ScoreResponse {
            entry: submission.entry,
            account: submission.account,
            is_new_personal_best: submission.is_new_personal_best,
        }),
    ))
}

pub(crate) async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let rows = state.ledger.top_scores(query.limit).await?;
    Ok(Json(rows))
}
