use std::collections::BTreeSet;

use serde_json::Value;

use crate::{
    Res,
    spotify::{client::EndpointCaller, endpoints::Endpoint},
    types::{AudioFeaturesResponse, SeveralTracksResponse, TrackRecord},
    warning,
};

/// Records of one successfully collected track batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackBatch {
    pub records: Vec<TrackRecord>,
    /// Every artist id referenced by the batch.
    pub artist_ids: BTreeSet<String>,
}

/// Fetches track metadata and audio features for one batch of track ids.
///
/// Both endpoints are called with the same comma-joined payload. If either yields no
/// data, or the two answers cannot be paired up, the whole batch is dropped and `None`
/// is returned: a batch is written completely or not at all.
pub async fn collect_track_batch(
    caller: &EndpointCaller,
    batch: &[String],
) -> Res<Option<TrackBatch>> {
    let track_ids = batch.join(",");
    let track_data = caller.call(Endpoint::Tracks, &track_ids).await?;
    let audio_features = caller.call(Endpoint::AudioFeatures, &track_ids).await?;

    let (Some(track_data), Some(audio_features)) = (track_data, audio_features) else {
        warning!("Did not receive suitable API response for processing tracks. Skipping batch...");
        return Ok(None);
    };

    match parse_track_responses(track_data, audio_features) {
        Ok(batch) => Ok(Some(batch)),
        Err(reason) => {
            warning!("{}. Skipping batch...", reason);
            Ok(None)
        }
    }
}

/// Pairs track metadata with audio features positionally and flattens each pair into a
/// [`TrackRecord`].
///
/// The API answers in request order, so the n-th track belongs to the n-th feature set.
/// Lists of different length or `null` entries make the pairing unreliable and reject the
/// batch.
pub fn parse_track_responses(
    track_data: Value,
    audio_features: Value,
) -> Result<TrackBatch, String> {
    let tracks: SeveralTracksResponse = serde_json::from_value(track_data)
        .map_err(|e| format!("Malformed track metadata response: {e}"))?;
    let features: AudioFeaturesResponse = serde_json::from_value(audio_features)
        .map_err(|e| format!("Malformed audio features response: {e}"))?;

    if tracks.tracks.len() != features.audio_features.len() {
        return Err(format!(
            "Track metadata ({}) and audio features ({}) are not aligned",
            tracks.tracks.len(),
            features.audio_features.len()
        ));
    }

    let mut batch = TrackBatch::default();
    for (position, (track, features)) in tracks
        .tracks
        .into_iter()
        .zip(features.audio_features)
        .enumerate()
    {
        let (Some(track), Some(features)) = (track, features) else {
            return Err(format!("Missing track data at position {position}"));
        };

        let record = TrackRecord::from_parts(track, features);
        batch.artist_ids.extend(record.artist_ids.iter().cloned());
        batch.records.push(record);
    }

    Ok(batch)
}
