use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{
    api::ballot::BallotSpec,
    auth::AuthToken,
    clock::{Clock, SharedClock},
    registry::{ElectionId, ElectionRegistry},
    voter::VoterRecord,
};

pub fn routes() -> Vec<Route> {
    routes![register, vote, voter_status]
}

/// Register the caller as a participant.
#[post("/elections/<election_id>/voters")]
fn register(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<SharedClock>,
    request: &RequestId,
) -> Result<()> {
    registry
        .get(election_id)?
        .register_voter(token.principal(), clock.now())?;
    info!(
        "{request} {} registered for election {election_id}",
        token.principal()
    );
    Ok(())
}

#[post("/elections/<election_id>/votes", data = "<ballot>", format = "json")]
fn vote(
    token: AuthToken,
    election_id: ElectionId,
    ballot: Json<BallotSpec>,
    registry: &State<ElectionRegistry>,
    clock: &State<SharedClock>,
    request: &RequestId,
) -> Result<()> {
    registry
        .get(election_id)?
        .vote(token.principal(), ballot.candidate_id, clock.now())?;
    info!(
        "{request} {} voted in election {election_id}",
        token.principal()
    );
    Ok(())
}

/// The caller's own registration and voting status.
#[get("/elections/<election_id>/voters/me")]
fn voter_status(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
) -> Result<Json<VoterRecord>> {
    let election = registry.get(election_id)?;
    Ok(Json(election.voter(token.principal())))
}
