use serde_json::Value;

use crate::{
    Res,
    spotify::{client::EndpointCaller, endpoints::Endpoint},
    types::{ArtistRecord, SeveralArtistsResponse},
    warning,
};

/// Fetches artist metadata for one batch of artist ids.
///
/// Returns `None` (after a warning) when the API yields no data or a malformed answer;
/// no partial batch is ever returned.
pub async fn collect_artist_batch(
    caller: &EndpointCaller,
    batch: &[String],
) -> Res<Option<Vec<ArtistRecord>>> {
    let artist_ids = batch.join(",");
    let Some(artist_data) = caller.call(Endpoint::Artists, &artist_ids).await? else {
        warning!("Did not receive suitable API response for processing artists. Skipping batch...");
        return Ok(None);
    };

    match parse_artist_responses(artist_data) {
        Ok(records) => Ok(Some(records)),
        Err(reason) => {
            warning!("{}. Skipping batch...", reason);
            Ok(None)
        }
    }
}

/// Flattens an artists response into one record per artist, pulling the follower count
/// out of its nested object (0 when absent).
pub fn parse_artist_responses(artist_data: Value) -> Result<Vec<ArtistRecord>, String> {
    let response: SeveralArtistsResponse = serde_json::from_value(artist_data)
        .map_err(|e| format!("Malformed artist response: {e}"))?;

    response
        .artists
        .into_iter()
        .enumerate()
        .map(|(position, artist)| {
            artist
                .map(ArtistRecord::from)
                .ok_or_else(|| format!("Missing artist data at position {position}"))
        })
        .collect()
}
