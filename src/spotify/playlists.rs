use crate::{
    Res, debug,
    spotify::{client::EndpointCaller, endpoints::Endpoint},
    types::PlaylistTracksPage,
    warning,
};

/// Walks every page of a playlist's track listing and returns the track ids in order.
///
/// Pages are followed through their `next` link until it is `null`. If a page comes back
/// as "no data" or cannot be decoded, the walk stops there with a warning and the ids
/// gathered so far are kept. Items without a track id (local files, removed tracks) are
/// skipped.
pub async fn get_playlist_track_ids(
    caller: &EndpointCaller,
    playlist_id: &str,
) -> Res<Vec<String>> {
    let mut track_ids: Vec<String> = Vec::new();
    let mut next_url = Some(Endpoint::PlaylistTracks.url(caller.api_url(), playlist_id));

    while let Some(url) = next_url {
        let Some(body) = caller
            .call_url(Endpoint::PlaylistTracks, playlist_id, &url)
            .await?
        else {
            warning!(
                "Did not receive suitable API response for playlist {}. Skipping...",
                playlist_id
            );
            break;
        };

        let page: PlaylistTracksPage = match serde_json::from_value(body) {
            Ok(page) => page,
            Err(e) => {
                warning!(
                    "Malformed page for playlist {}: {}. Skipping...",
                    playlist_id,
                    e
                );
                break;
            }
        };

        track_ids.extend(
            page.items
                .into_iter()
                .filter_map(|item| item.track.and_then(|t| t.id)),
        );
        next_url = page.next;
    }

    debug!(
        "Collected {} track ids for playlist {}",
        track_ids.len(),
        playlist_id
    );
    Ok(track_ids)
}

/// Collects the track ids of every playlist, in playlist order.
pub async fn get_track_ids(caller: &EndpointCaller, playlist_ids: &[String]) -> Res<Vec<String>> {
    let mut track_ids = Vec::new();
    for playlist_id in playlist_ids {
        debug!("Collecting track ids for playlist id: {}", playlist_id);
        track_ids.extend(get_playlist_track_ids(caller, playlist_id).await?);
    }
    Ok(track_ids)
}
