// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{BidPipeline, InsightService, PipelineError, VotePipeline};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tally_ballot::{
    AuctionTally, Clock, ProposalId, RawBid, RawVote, SystemClock, Timeline, VoteTally,
    WinningBid,
};
use tally_data::DataStore;
use tracing::{error, info};

/// Status code and JSON body, shaped like an HTTP reply.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineResponse {
    pub status: u16,
    pub body: Value,
}

impl PipelineResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            body: json!({ "error": message.into() }),
        }
    }

    fn internal(message: &str, details: impl ToString) -> Self {
        Self {
            status: 500,
            body: json!({ "error": message, "details": details.to_string() }),
        }
    }
}

/// Entry point for JSON requests carrying votes, bids or an insight query.
pub struct RequestHandler<S: DataStore> {
    votes: Arc<VotePipeline<S>>,
    bids: Arc<BidPipeline<S>>,
    insight: Arc<dyn InsightService>,
    clock: Arc<dyn Clock>,
}

impl<S: DataStore> RequestHandler<S> {
    pub fn new(
        votes: Arc<VotePipeline<S>>,
        bids: Arc<BidPipeline<S>>,
        insight: Arc<dyn InsightService>,
    ) -> Self {
        Self {
            votes,
            bids,
            insight,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn handle(&self, request: &str) -> PipelineResponse {
        let data: Value = match serde_json::from_str(request) {
            Ok(data) => data,
            Err(e) => return PipelineResponse::bad_request(format!("Malformed request: {e}")),
        };

        match data.get("type").and_then(Value::as_str) {
            None => PipelineResponse::bad_request("Missing operation type"),
            Some("vote") => self.handle_votes(&data).await,
            Some("bid") => self.handle_bids(&data).await,
            Some("ai_insight") => self.handle_insight(&data).await,
            Some(other) => {
                info!(operation = other, "Rejected request");
                PipelineResponse::bad_request(
                    "Invalid operation type. Must be 'vote', 'bid', or 'ai_insight'",
                )
            }
        }
    }

    async fn handle_votes(&self, data: &Value) -> PipelineResponse {
        let Some(entries) = data.get("encryptedVotes").and_then(Value::as_array) else {
            return PipelineResponse::bad_request("Invalid encrypted votes format");
        };
        let proposal_id = id_field(data, "proposalId");
        let raw_votes: Vec<RawVote> = entries.iter().cloned().map(RawVote::from_json).collect();

        match self.votes.process(&raw_votes, &proposal_id).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(body) => PipelineResponse::ok(tagged("vote_results", body)),
                Err(e) => PipelineResponse::internal("Vote processing error", e),
            },
            Err(e) => fatal("Vote processing error", e),
        }
    }

    async fn handle_bids(&self, data: &Value) -> PipelineResponse {
        let Some(entries) = data.get("sealedBids").and_then(Value::as_array) else {
            return PipelineResponse::bad_request("Invalid sealed bids format");
        };
        let project_id = id_field(data, "projectId");
        let raw_bids: Vec<RawBid> = entries.iter().cloned().map(RawBid::from_json).collect();

        match self.bids.process(&raw_bids, &project_id).await {
            Ok(outcome) => match serde_json::to_value(&outcome) {
                Ok(body) => PipelineResponse::ok(tagged("auction_results", body)),
                Err(e) => PipelineResponse::internal("Bid processing error", e),
            },
            Err(e) => fatal("Bid processing error", e),
        }
    }

    async fn handle_insight(&self, data: &Value) -> PipelineResponse {
        let data_type = data.get("dataType").and_then(Value::as_str);
        let data_id = data.get("dataId").filter(|v| !v.is_null());
        let (Some(data_type), Some(data_id)) = (data_type, data_id) else {
            return PipelineResponse::bad_request("Missing dataType or dataId");
        };
        let id = ProposalId::new(id_text(data_id));

        let insight = match data_type {
            "vote" => {
                let distribution = data.get("voteDistribution");
                let count = |name: &str| {
                    distribution
                        .and_then(|d| d.get(name))
                        .and_then(Value::as_u64)
                        .unwrap_or(0)
                };
                let tally = match VoteTally::from_counts(
                    count("inFavor"),
                    count("against"),
                    count("abstain"),
                ) {
                    Ok(tally) => tally,
                    Err(e) => return PipelineResponse::bad_request(e.to_string()),
                };
                self.insight
                    .summarize_votes(&id, &tally, &Timeline::default())
                    .await
            }
            "auction" => {
                let winning_amount = data
                    .get("winningAmount")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                let winner = data
                    .get("winner")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| (winning_amount > 0).then(|| "unknown".to_string()));
                let auction = AuctionTally {
                    winner: winner.map(|bidder| WinningBid {
                        bidder,
                        amount: winning_amount,
                        index: 0,
                    }),
                    bid_count: data.get("totalBids").and_then(Value::as_u64).unwrap_or(0),
                };
                self.insight.summarize_auction(&id, &auction).await
            }
            _ => {
                return PipelineResponse::bad_request(
                    "Invalid dataType. Must be 'vote' or 'auction'",
                )
            }
        };

        match insight {
            Ok(insight) => PipelineResponse::ok(json!({
                "type": "ai_insights",
                "dataId": data_id,
                "dataType": data_type,
                "insights": insight.summary,
                "confidence": insight.confidence,
                "timestamp": self.clock.now_millis(),
            })),
            Err(e) => {
                error!("Insight request failed: {e:#}");
                PipelineResponse::internal("AI insight generation error", format!("{e:#}"))
            }
        }
    }
}

fn fatal(message: &str, e: PipelineError) -> PipelineResponse {
    error!("{message}: {e}");
    PipelineResponse::internal(message, e)
}

fn tagged(kind: &str, mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert("type".to_string(), Value::from(kind));
    }
    body
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Missing or empty ids become "unknown".
fn id_field(data: &Value, field: &str) -> ProposalId {
    let id = data
        .get(field)
        .filter(|v| !v.is_null())
        .map(id_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    ProposalId::new(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_default_to_unknown() {
        let data = json!({ "proposalId": 7, "projectId": null });
        assert_eq!(id_field(&data, "proposalId").as_str(), "7");
        assert_eq!(id_field(&data, "projectId").as_str(), "unknown");
        assert_eq!(id_field(&json!({}), "proposalId").as_str(), "unknown");
    }

    #[test]
    fn tagging_adds_type() {
        let body = tagged("vote_results", json!({ "a": 1 }));
        assert_eq!(body["type"], "vote_results");
        assert_eq!(body["a"], 1);
    }
}
