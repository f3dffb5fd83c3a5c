//! geocoding.rs — Nominatim forward/reverse geocoding.
//!
//! Forward: place name → coordinates + display name. Reverse: coordinates →
//! best-effort place name assembled from the structured address, falling back
//! to the first pieces of `display_name`. Geocoding failure surfaces as
//! "location not found" and never reaches the scorer.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

/// Structured address pieces Nominatim returns; all optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub suburb: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub road: Option<String>,
    pub hamlet: Option<String>,
    pub water: Option<String>,
    pub natural: Option<String>,
    pub leisure: Option<String>,
}

pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent.to_string())
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url: NOMINATIM_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_request(&self, place: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}/search", self.base_url)).query(&[
            ("q", place),
            ("format", "json"),
            ("limit", "1"),
            ("accept-language", "zh-CN"),
        ])
    }

    /// Place name → coordinates. Errors when nothing matches.
    pub async fn geocode(&self, place: &str) -> Result<GeoPoint> {
        let hits: Vec<SearchHit> = self
            .search_request(place)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("parsing geocoding response")?;

        let hit = hits.into_iter().next().ok_or_else(|| anyhow!("未找到该地点"))?;
        Ok(GeoPoint {
            latitude: hit.lat.parse().context("latitude not numeric")?,
            longitude: hit.lon.parse().context("longitude not numeric")?,
            display_name: hit.display_name,
        })
    }

    /// Coordinates → best-effort place name. Failures fall back to a plain
    /// "位置 (lat, lon)" label; reverse lookup is cosmetic.
    pub async fn reverse(&self, lat: f64, lon: f64) -> String {
        match self.try_reverse(lat, lon).await {
            Ok(Some(name)) => name,
            Ok(None) | Err(_) => format!("位置 ({lat:.2}, {lon:.2})"),
        }
    }

    async fn try_reverse(&self, lat: f64, lon: f64) -> Result<Option<String>> {
        let resp: ReverseResponse = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_string()),
                ("accept-language", "zh-CN".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(addr) = &resp.address {
            if let Some(name) = assemble_place_name(addr) {
                return Ok(Some(name));
            }
        }
        // No structured address: take the first pieces of display_name.
        Ok(resp.display_name.map(|d| {
            d.split(',')
                .take(3)
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string()
        }))
    }
}

/// Assemble a readable place name from structured address parts:
/// city/county/state → district → suburb/town/village → road/hamlet →
/// water/natural/leisure landmark; dedupe; join without separators when two
/// or fewer parts remain.
pub fn assemble_place_name(addr: &NominatimAddress) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(city) = addr.city.as_deref() {
        parts.push(city);
    } else if let Some(county) = addr.county.as_deref() {
        parts.push(county);
    } else if let Some(state) = addr.state.as_deref() {
        parts.push(state);
    }

    match (addr.county.as_deref(), addr.city.as_deref()) {
        (Some(county), city) if city != Some(county) => parts.push(county),
        _ => {
            if let Some(district) = addr.district.as_deref() {
                parts.push(district);
            }
        }
    }

    if let Some(suburb) = addr.suburb.as_deref() {
        parts.push(suburb);
    } else if let Some(town) = addr.town.as_deref() {
        parts.push(town);
    } else if let Some(village) = addr.village.as_deref() {
        parts.push(village);
    }

    if let Some(road) = addr.road.as_deref() {
        parts.push(road);
    } else if let Some(hamlet) = addr.hamlet.as_deref() {
        parts.push(hamlet);
    }

    if let Some(landmark) = addr
        .water
        .as_deref()
        .or(addr.natural.as_deref())
        .or(addr.leisure.as_deref())
    {
        parts.push(landmark);
    }

    let mut unique: Vec<&str> = Vec::new();
    for p in parts {
        if !p.is_empty() && !unique.contains(&p) {
            unique.push(p);
        }
    }

    if unique.is_empty() {
        return None;
    }
    let joined = if unique.len() <= 2 {
        unique.concat()
    } else {
        unique.join(" ")
    };
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_city_district_suburb() {
        let addr = NominatimAddress {
            city: Some("武汉市".into()),
            district: Some("洪山区".into()),
            suburb: Some("珞珈山街道".into()),
            water: Some("东湖".into()),
            ..Default::default()
        };
        assert_eq!(
            assemble_place_name(&addr).unwrap(),
            "武汉市 洪山区 珞珈山街道 东湖"
        );
    }

    #[test]
    fn two_parts_join_without_spaces() {
        let addr = NominatimAddress {
            city: Some("武汉市".into()),
            suburb: Some("南湖街道".into()),
            ..Default::default()
        };
        assert_eq!(assemble_place_name(&addr).unwrap(), "武汉市南湖街道");
    }

    #[test]
    fn county_used_when_distinct_from_city() {
        let addr = NominatimAddress {
            city: Some("黄冈市".into()),
            county: Some("红安县".into()),
            village: Some("七里坪镇".into()),
            ..Default::default()
        };
        assert_eq!(
            assemble_place_name(&addr).unwrap(),
            "黄冈市 红安县 七里坪镇"
        );
    }

    #[test]
    fn duplicate_parts_collapse() {
        let addr = NominatimAddress {
            county: Some("神农架林区".into()),
            ..Default::default()
        };
        // county fills both the city slot and the county slot; dedupe keeps one.
        assert_eq!(assemble_place_name(&addr).unwrap(), "神农架林区");
    }

    #[test]
    fn empty_address_yields_none() {
        assert_eq!(assemble_place_name(&NominatimAddress::default()), None);
    }

    #[test]
    fn search_query_is_percent_encoded() {
        let client = GeocodingClient::new("test-agent").unwrap();
        let req = client.search_request("武汉 东湖").build().unwrap();
        let url = req.url().as_str();
        assert!(url.contains("q=%E6%AD%A6%E6%B1%89+%E4%B8%9C%E6%B9%96"), "{url}");
        assert!(url.contains("format=json"), "{url}");
        assert!(url.contains("accept-language=zh-CN"), "{url}");
    }
}
