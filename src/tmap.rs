//! TMap routing and geocoding.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::client::Api;
use crate::error::{Error, ErrorKind, Result};
use crate::models::{LatLng, SpatialPoint};
use crate::result::ApiResult;
use crate::transport::{ApiRequest, AuthMode};

const ROUTES_PATH: &str = "/tmap/routes";
const GEOCODING_PATH: &str = "/tmap/geo/fullAddrGeo";
const REVERSE_GEOCODING_PATH: &str = "/tmap/geo/reversegeocoding";
const CONVERT_ADDRESS_PATH: &str = "/tmap/geo/convertAddress";

const COORD_TYPE: &str = "WGS84GEO";

/// Route search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOption {
    #[default]
    Recommended,
    FreeRoad,
    Fastest,
    Beginner,
    Highway,
    Shortest,
}

impl SearchOption {
    /// Numeric value of the `searchOption` parameter.
    pub fn as_param(&self) -> u8 {
        match self {
            SearchOption::Recommended => 0,
            SearchOption::FreeRoad => 1,
            SearchOption::Fastest => 2,
            SearchOption::Beginner => 3,
            SearchOption::Highway => 4,
            SearchOption::Shortest => 10,
        }
    }
}

/// Options for distance calculation.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub search_option: SearchOption,
    /// Extra route parameters, sent as given. They override the defaults.
    pub extra: Map<String, Value>,
}

impl RouteOptions {
    pub fn new(search_option: SearchOption) -> Self {
        Self {
            search_option,
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Target address system of [`TMap::convert_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    /// Road-name address.
    #[default]
    New,
    /// Lot-number address.
    Old,
}

impl AddressType {
    fn search_type(&self) -> &'static str {
        match self {
            AddressType::New => "OtoN",
            AddressType::Old => "NtoO",
        }
    }

    fn list_pointer(&self) -> &'static str {
        match self {
            AddressType::New => "/ConvertAdd/newAddressList/newAddress",
            AddressType::Old => "/ConvertAdd/oldAddressList/oldAddress",
        }
    }
}

/// TMap API facade.
#[derive(Debug)]
pub struct TMap {
    api: Api,
}

impl TMap {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Driving distance in meters between two points.
    #[instrument(skip(self, options))]
    pub async fn get_distance(
        &self,
        from: &LatLng,
        to: &LatLng,
        options: &RouteOptions,
    ) -> Result<u64> {
        let request = self
            .request(ApiRequest::post(ROUTES_PATH))
            .param("startX", from.spatial_lng())
            .param("startY", from.spatial_lat())
            .param("endX", to.spatial_lng())
            .param("endY", to.spatial_lat())
            .param("reqCoordType", COORD_TYPE)
            .param("resCoordType", COORD_TYPE)
            .param("searchOption", options.search_option.as_param())
            .params(options.extra.clone());

        let result = self.api.request(request).await?;
        total_distance(&result)
    }

    /// Distances between each adjacent pair of `points`, in order.
    pub async fn get_distances(
        &self,
        points: &[LatLng],
        options: &RouteOptions,
    ) -> Result<Vec<u64>> {
        if points.is_empty() {
            return Err(Error::validation("At least one point is required"));
        }

        let mut distances = Vec::with_capacity(points.len() - 1);
        for pair in points.windows(2) {
            distances.push(self.get_distance(&pair[0], &pair[1], options).await?);
        }
        debug!(legs = distances.len(), "Distances calculated");
        Ok(distances)
    }

    /// Coordinates of a full address.
    #[instrument(skip(self))]
    pub async fn geocoding(&self, address: &str) -> Result<LatLng> {
        let address = non_blank("address", address)?;
        let request = self
            .request(ApiRequest::get(GEOCODING_PATH))
            .param("fullAddr", address)
            .param("addressFlag", "F00")
            .param("coordType", COORD_TYPE);

        let result = self.api.request(request).await?;
        let coordinate = result
            .pointer("/coordinateInfo/coordinate/0")
            .ok_or_else(|| null_response(format!("No coordinate found for '{}'", address)))?;

        let (lat, lng) = coordinate_pair(coordinate, "lat", "lon")
            .or_else(|| coordinate_pair(coordinate, "newLat", "newLon"))
            .ok_or_else(|| null_response(format!("No coordinate found for '{}'", address)))?;

        LatLng::new(lat, lng)
            .map_err(|e| Error::decode(format!("Invalid coordinate in response: {}", e)))
    }

    /// Road-name address of a point.
    #[instrument(skip(self, point), fields(lat = point.spatial_lat(), lng = point.spatial_lng()))]
    pub async fn reverse_geocoding(&self, point: &impl SpatialPoint) -> Result<String> {
        let request = self
            .request(ApiRequest::get(REVERSE_GEOCODING_PATH))
            .param("lat", point.spatial_lat())
            .param("lon", point.spatial_lng())
            .param("coordType", COORD_TYPE)
            .param("addressType", "A10");

        let result = self.api.request(request).await?;
        match result.search_str("addressInfo.fullAddress")? {
            Some(address) if !address.trim().is_empty() => Ok(address.to_string()),
            _ => Err(null_response(format!(
                "No address found at {},{}",
                point.spatial_lat(),
                point.spatial_lng()
            ))),
        }
    }

    /// Convert between lot-number and road-name addresses.
    #[instrument(skip(self))]
    pub async fn convert_address(&self, address: &str, target: AddressType) -> Result<String> {
        let address = non_blank("address", address)?;
        let request = self
            .request(ApiRequest::get(CONVERT_ADDRESS_PATH))
            .param("reqAdd", address)
            .param("searchTypCd", target.search_type())
            .param("reqMulti", "S")
            .param("resCoordType", COORD_TYPE);

        let result = self.api.request(request).await?;
        let entry = match result.pointer(target.list_pointer()) {
            Some(Value::Array(items)) => items.first(),
            Some(item @ Value::Object(_)) => Some(item),
            _ => None,
        };

        entry
            .and_then(|e| e.get("fullAddress"))
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| null_response(format!("No converted address for '{}'", address)))
    }

    fn request(&self, request: ApiRequest) -> ApiRequest {
        request
            .query("version", self.api.configuration().version())
            .auth(AuthMode::StaticKey)
    }
}

fn total_distance(result: &ApiResult) -> Result<u64> {
    let value = result
        .pointer("/features/0/properties/totalDistance")
        .ok_or_else(|| Error::decode("Route response missing totalDistance"))?;

    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::decode(format!("Invalid totalDistance: {}", value)))
}

fn coordinate_pair<'a>(coordinate: &'a Value, lat: &str, lng: &str) -> Option<(&'a str, &'a str)> {
    let lat = coordinate.get(lat)?.as_str().filter(|s| !s.is_empty())?;
    let lng = coordinate.get(lng)?.as_str().filter(|s| !s.is_empty())?;
    Some((lat, lng))
}

fn non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", name)));
    }
    Ok(value)
}

fn null_response(message: String) -> Error {
    Error::provider(ErrorKind::NullResponse, message, 200)
}
