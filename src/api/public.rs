use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::election::{ElectionDescription, ElectionSummary},
    candidate::{Candidate, CandidateId},
    election::{ElectionPhase, TimeWindows},
    notification::Notification,
    registry::{ElectionId, ElectionRegistry},
};

pub fn routes() -> Vec<Route> {
    routes![
        elections,
        election_count,
        election,
        election_phase,
        election_candidates,
        election_candidate,
        election_windows,
        election_journal,
    ]
}

/// Every election, in creation order.
#[get("/elections")]
fn elections(registry: &State<ElectionRegistry>) -> Json<Vec<ElectionSummary>> {
    Json(
        registry
            .all()
            .iter()
            .map(|election| election.summarize())
            .collect(),
    )
}

#[get("/elections/count")]
fn election_count(registry: &State<ElectionRegistry>) -> Json<usize> {
    Json(registry.count())
}

#[get("/elections/<election_id>")]
fn election(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<ElectionDescription>> {
    Ok(Json(registry.get(election_id)?.describe()))
}

#[get("/elections/<election_id>/phase")]
fn election_phase(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<ElectionPhase>> {
    Ok(Json(registry.get(election_id)?.phase()))
}

#[get("/elections/<election_id>/candidates")]
fn election_candidates(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<Vec<Candidate>>> {
    Ok(Json(registry.get(election_id)?.candidates()))
}

#[get("/elections/<election_id>/candidates/<candidate_id>")]
fn election_candidate(
    election_id: ElectionId,
    candidate_id: CandidateId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<Candidate>> {
    Ok(Json(registry.get(election_id)?.candidate(candidate_id)?))
}

#[get("/elections/<election_id>/windows")]
fn election_windows(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<TimeWindows>> {
    Ok(Json(registry.get(election_id)?.windows()))
}

/// Replay an election's notifications after sequence number `since`.
#[get("/elections/<election_id>/journal?<since>")]
fn election_journal(
    election_id: ElectionId,
    since: Option<u64>,
    registry: &State<ElectionRegistry>,
) -> Result<Json<Vec<Notification>>> {
    let election = registry.get(election_id)?;
    Ok(Json(election.journal(since.unwrap_or(0))))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;
    use crate::api::test_util::{create_election, election_in_registration, post_as};
    use crate::model::{
        clock::{Clock, ManualClock},
        notification::Event,
        principal::Principal,
    };

    #[backend_test]
    async fn empty_registry(client: Client) {
        let response = client.get("/elections").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_json::<Vec<ElectionSummary>>().await,
            Some(vec![])
        );

        for uri in [
            "/elections/1",
            "/elections/1/phase",
            "/elections/1/candidates",
            "/elections/1/candidates/1",
            "/elections/1/windows",
            "/elections/1/journal",
        ] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(response.status(), Status::NotFound, "{uri}");
        }
    }

    #[backend_test]
    async fn list_and_count(client: Client) {
        create_election(&client, "org").await;
        election_in_registration(&client, "org").await;

        let response = client.get("/elections").dispatch().await;
        let summaries: Vec<ElectionSummary> = response.into_json().await.unwrap();
        let phases: Vec<_> = summaries.iter().map(|s| (s.id, s.phase)).collect();
        assert_eq!(
            phases,
            vec![(1, ElectionPhase::Created), (2, ElectionPhase::Registration)]
        );

        let response = client.get("/elections/count").dispatch().await;
        assert_eq!(response.into_json::<usize>().await, Some(2));
    }

    #[backend_test]
    async fn candidate_lookup(client: Client) {
        let id = election_in_registration(&client, "org").await;

        let response = client
            .get(format!("/elections/{id}/candidates/2"))
            .dispatch()
            .await;
        let candidate: Candidate = response.into_json().await.unwrap();
        assert_eq!(candidate.name, "Bob");
        assert_eq!(candidate.vote_count, 0);

        for missing in [0, 3] {
            let response = client
                .get(format!("/elections/{id}/candidates/{missing}"))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::NotFound);
        }
    }

    #[backend_test]
    async fn windows_are_published(client: Client, clock: ManualClock) {
        clock.advance(Duration::seconds(30));
        let description = create_election(&client, "org").await;

        let response = client
            .get(format!("/elections/{}/windows", description.id))
            .dispatch()
            .await;
        let windows: TimeWindows = response.into_json().await.unwrap();
        assert_eq!(windows, description.windows);
        assert!(windows.registration.contains(clock.now()));
        assert!(!windows.voting.contains(clock.now()));
    }

    #[backend_test]
    async fn journal_replays_in_order(client: Client, clock: ManualClock) {
        let id = election_in_registration(&client, "org").await;
        clock.advance(Duration::seconds(10));
        assert_eq!(
            post_as(&client, "v", format!("/elections/{id}/voters")).await,
            Status::Ok
        );

        let response = client
            .get(format!("/elections/{id}/journal"))
            .dispatch()
            .await;
        let journal: Vec<Notification> = response.into_json().await.unwrap();
        let sequences: Vec<_> = journal.iter().map(|n| n.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
        assert!(journal.iter().all(|n| n.election_id == id));
        assert_eq!(
            journal[4].event,
            Event::VoterRegistered {
                voter: Principal::voter("v")
            }
        );

        let response = client
            .get(format!("/elections/{id}/journal?since=3"))
            .dispatch()
            .await;
        let tail: Vec<Notification> = response.into_json().await.unwrap();
        assert_eq!(tail, journal[3..].to_vec());
    }
}
