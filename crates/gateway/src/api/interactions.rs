//! `POST /interactions`: Discord's HTTP interactions endpoint.
//!
//! The HTTP response is the acknowledgment.  It is computed without any
//! store or generator call; the pipeline run is spawned before the
//! response is returned.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::discord::interaction::INTERACTION_PING;
use crate::discord::{Interaction, InteractionReply, InteractionResponse, Rejection};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-signature-ed25519";
const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let verified = match (signature, timestamp) {
        (Some(sig), Some(ts)) => state.verifier.verify(ts, &body, sig),
        _ => false,
    };
    if !verified {
        tracing::warn!(
            has_signature = signature.is_some(),
            has_timestamp = timestamp.is_some(),
            "interaction signature rejected"
        );
        return error(StatusCode::UNAUTHORIZED, "invalid request signature");
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            tracing::warn!(error = %e, "malformed interaction body");
            return error(StatusCode::BAD_REQUEST, "malformed interaction");
        }
    };

    if interaction.kind == INTERACTION_PING {
        tracing::debug!("interaction ping");
        return Json(InteractionResponse::pong()).into_response();
    }

    match state.catalog.parse(&interaction) {
        Ok(command) => {
            tracing::info!(
                command = %command.name,
                issuer = %command.issuer.id,
                issuer_name = %command.issuer.display_name,
                guild = ?interaction.guild_id,
                "command received"
            );
            let reply = Arc::new(InteractionReply::new(
                state.discord.clone(),
                interaction.token.clone(),
                interaction.channel_id.clone(),
            ));
            let ack = state.pipeline.dispatch(command, reply);
            Json(InteractionResponse::from_ack(&ack)).into_response()
        }
        Err(Rejection::NotACommand) => {
            tracing::debug!(kind = interaction.kind, "unsupported interaction type");
            error(StatusCode::BAD_REQUEST, "unsupported interaction type")
        }
        Err(rejection) => {
            tracing::info!(reason = %rejection, "command rejected");
            Json(InteractionResponse::ephemeral(rejection.user_message())).into_response()
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
