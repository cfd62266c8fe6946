use serde::{Deserialize, Serialize};

/// One contest year as stored in the editions collection.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Edition {
    #[serde(rename = "anyo")]
    pub year: i32,
    #[serde(rename = "pais")]
    pub host_country: String,
    #[serde(rename = "ciudad")]
    pub host_city: String,
    #[serde(rename = "concursantes", default)]
    pub entries: Vec<Entry>,
}

/// A country's participation in a single edition. Always embedded in its
/// [`Edition`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Entry {
    #[serde(rename = "id_pais", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "artista")]
    pub artist: String,
    #[serde(rename = "cancion")]
    pub song: String,
    /// Final position, 1 being the winner.
    #[serde(rename = "resultado", default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<i32>,
    #[serde(rename = "puntuacion", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "url_youtube", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Entry {
    pub fn has_video(&self) -> bool {
        self.video_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
