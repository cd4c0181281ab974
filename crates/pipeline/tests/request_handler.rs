// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tally_ballot::ManualClock;
use tally_data::InMemoryStore;
use tally_pipeline::RequestHandler;
use tally_test_helpers::{
    bid_pipeline, memory_store, template_insight, vote_pipeline, FailingInsightService,
    FlakyAttestationProvider,
};

fn handler() -> RequestHandler<InMemoryStore> {
    let clock = Arc::new(ManualClock::new(5_000));
    let store = memory_store();
    RequestHandler::new(
        Arc::new(vote_pipeline(store.clone(), &clock)),
        Arc::new(bid_pipeline(store, &clock)),
        template_insight(&clock),
    )
    .with_clock(clock)
}

#[tokio::test]
async fn vote_request_returns_results() -> Result<()> {
    let request = json!({
        "type": "vote",
        "proposalId": 42,
        "encryptedVotes": [
            {"option": "inFavor", "timestamp": 1},
            "{\"option\":\"against\",\"timestamp\":2}",
            {"option": "inFavor", "timestamp": 3},
            {"option": "abstain", "timestamp": 3},
            "definitely not a vote"
        ]
    });
    let response = handler().handle(&request.to_string()).await;

    assert_eq!(response.status, 200);
    let body = response.body;
    assert_eq!(body["type"], "vote_results");
    assert_eq!(body["proposalId"], "42");
    assert_eq!(body["tally"]["inFavor"], 2);
    assert_eq!(body["tally"]["against"], 1);
    assert_eq!(body["tally"]["abstain"], 1);
    assert_eq!(body["decodeFailures"], 1);
    assert!(body["proof"]["digest"].as_str().unwrap().starts_with("0x"));
    assert_eq!(body["storageReference"]["key"], "_tally:vote:42");
    Ok(())
}

#[tokio::test]
async fn bid_request_returns_winner() -> Result<()> {
    let request = json!({
        "type": "bid",
        "sealedBids": [
            "{\"bidder\":\"0x123\",\"amount\":100}",
            "{\"bidder\":\"0x456\",\"amount\":200}"
        ]
    });
    let response = handler().handle(&request.to_string()).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["type"], "auction_results");
    assert_eq!(response.body["projectId"], "unknown");
    assert_eq!(response.body["winnerReference"], "0x456");
    assert_eq!(response.body["winningAmount"], 200);
    assert_eq!(response.body["bidCount"], 2);
    Ok(())
}

#[tokio::test]
async fn insight_request_summarizes_distribution() -> Result<()> {
    let request = json!({
        "type": "ai_insight",
        "dataType": "vote",
        "dataId": "p-1",
        "voteDistribution": {"inFavor": 5, "against": 2, "abstain": 1}
    });
    let response = handler().handle(&request.to_string()).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["type"], "ai_insights");
    assert_eq!(response.body["dataId"], "p-1");
    assert_eq!(response.body["timestamp"], 5_000);
    assert!(response.body["insights"]
        .as_str()
        .unwrap()
        .contains("8 votes"));

    let auction = json!({
        "type": "ai_insight",
        "dataType": "auction",
        "dataId": 3,
        "winningAmount": 1000,
        "totalBids": 4
    });
    let response = handler().handle(&auction.to_string()).await;
    assert_eq!(response.status, 200);
    assert!(response.body["insights"]
        .as_str()
        .unwrap()
        .contains("reserve price of 800"));
    Ok(())
}

#[tokio::test]
async fn invalid_requests_are_rejected() -> Result<()> {
    let handler = handler();
    for request in [
        json!({}),
        json!({"type": "refund"}),
        json!({"type": "vote", "proposalId": 1}),
        json!({"type": "vote", "encryptedVotes": "0x01"}),
        json!({"type": "bid"}),
        json!({"type": "ai_insight", "dataType": "vote"}),
        json!({"type": "ai_insight", "dataType": "weather", "dataId": 1}),
    ] {
        let response = handler.handle(&request.to_string()).await;
        assert_eq!(response.status, 400, "request {request} should be rejected");
        assert!(response.body["error"].is_string());
    }

    let response = handler.handle("{not json").await;
    assert_eq!(response.status, 400);
    Ok(())
}

#[tokio::test]
async fn fatal_errors_return_500() -> Result<()> {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store();
    let handler = RequestHandler::new(
        Arc::new(
            vote_pipeline(store.clone(), &clock)
                .with_attestation(Arc::new(FlakyAttestationProvider::new(true))),
        ),
        Arc::new(bid_pipeline(store, &clock)),
        Arc::new(FailingInsightService),
    );

    let response = handler
        .handle(&json!({"type": "vote", "encryptedVotes": []}).to_string())
        .await;
    assert_eq!(response.status, 500);
    assert_eq!(response.body["error"], "Vote processing error");

    let response = handler
        .handle(&json!({"type": "ai_insight", "dataType": "vote", "dataId": 1}).to_string())
        .await;
    assert_eq!(response.status, 500);
    Ok(())
}
