mod common;

use apikr::tmap::{AddressType, RouteOptions, SearchOption};
use apikr::{Error, ErrorKind, LatLng, SpatialPoint, TMap};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn route_body(distance: u64) -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"totalDistance": distance, "totalTime": 3600, "totalFare": 0}
        }]
    })
}

fn seoul_station() -> LatLng {
    LatLng::new("37.55510690", "126.97069110").unwrap()
}

fn daegu() -> LatLng {
    LatLng::new("35.87143540", "128.60144500").unwrap()
}

#[tokio::test]
async fn test_get_distance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tmap/routes"))
        .and(query_param("version", "1"))
        .and(header("appKey", common::TMAP_KEY))
        .and(body_string_contains("startX=126.97069110"))
        .and(body_string_contains("startY=37.55510690"))
        .and(body_string_contains("endX=128.60144500"))
        .and(body_string_contains("searchOption=10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body(277922)))
        .expect(1)
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let distance = tmap
        .get_distance(&seoul_station(), &daegu(), &RouteOptions::new(SearchOption::Shortest))
        .await
        .unwrap();

    assert_eq!(distance, 277922);
}

#[tokio::test]
async fn test_get_distances_in_order() {
    let server = MockServer::start().await;
    let legs = [
        ("startX=126.97069110", 11767),
        ("startX=127.07185000", 157973),
        ("startX=127.42067930", 137077),
    ];
    for (start, distance) in legs {
        Mock::given(method("POST"))
            .and(path("/tmap/routes"))
            .and(body_string_contains(start))
            .respond_with(ResponseTemplate::new(200).set_body_json(route_body(distance)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let points = [
        seoul_station(),
        LatLng::new("37.54053970", "127.07185000").unwrap(),
        LatLng::new("36.32598610", "127.42067930").unwrap(),
        daegu(),
    ];
    let tmap = TMap::new(common::tmap_api(&server));
    let distances = tmap
        .get_distances(&points, &RouteOptions::new(SearchOption::Shortest))
        .await
        .unwrap();

    assert_eq!(distances, vec![11767, 157973, 137077]);
}

#[tokio::test]
async fn test_get_distances_edge_cases() {
    let server = MockServer::start().await;
    let tmap = TMap::new(common::tmap_api(&server));

    let err = tmap.get_distances(&[], &RouteOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let single = tmap
        .get_distances(&[seoul_station()], &RouteOptions::default())
        .await
        .unwrap();
    assert!(single.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_geocoding_old_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/fullAddrGeo"))
        .and(query_param("version", "1"))
        .and(query_param("fullAddr", "서울 노원구 상계6동 746-3"))
        .and(query_param("coordType", "WGS84GEO"))
        .and(header("appKey", common::TMAP_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coordinateInfo": {
                "coordType": "WGS84GEO",
                "addressFlag": "F01",
                "coordinate": [{
                    "lat": "37.650592",
                    "lon": "127.061217",
                    "newLat": "",
                    "newLon": ""
                }]
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let point = tmap.geocoding("서울 노원구 상계6동 746-3").await.unwrap();

    assert_eq!(point.spatial_lat(), "37.650592");
    assert_eq!(point.spatial_lng(), "127.061217");
}

#[tokio::test]
async fn test_geocoding_new_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/fullAddrGeo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coordinateInfo": {
                "coordinate": [{
                    "lat": "",
                    "lon": "",
                    "newLat": "37.563411",
                    "newLon": "126.982886"
                }]
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let point = tmap.geocoding("서울 중구 명동길 14 7층").await.unwrap();

    assert_eq!(point.spatial_lat(), "37.563411");
    assert_eq!(point.spatial_lng(), "126.982886");
}

#[tokio::test]
async fn test_geocoding_bad_request_passes_message_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/fullAddrGeo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "id": "400",
                "category": "tmap",
                "code": "A2C521",
                "message": "요청 데이터 오류입니다.([A2C521]주소 형식 오류입니다.)"
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let err = tmap.geocoding("모름 알수 없음.").await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    assert_eq!(
        err.to_string(),
        "요청 데이터 오류입니다.([A2C521]주소 형식 오류입니다.)"
    );
    assert_eq!(err.provider_code(), Some("A2C521"));
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_geocoding_empty_address_not_sent() {
    let server = MockServer::start().await;
    let tmap = TMap::new(common::tmap_api(&server));

    let err = tmap.geocoding("   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reverse_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/reversegeocoding"))
        .and(query_param("lat", "37.563411"))
        .and(query_param("lon", "127.061217"))
        .and(query_param("addressType", "A10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "addressInfo": {
                "fullAddress": "서울특별시 동대문구 한천로6길 36",
                "addressType": "A10"
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let address = tmap
        .reverse_geocoding(&LatLng::new("37.563411", "127.061217").unwrap())
        .await
        .unwrap();

    assert_eq!(address, "서울특별시 동대문구 한천로6길 36");
}

#[tokio::test]
async fn test_reverse_geocoding_no_match_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/reversegeocoding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "id": "404",
                "category": "tmap",
                "code": "9401",
                "message": "처리중 에러가 발생하였습니다."
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let err = tmap
        .reverse_geocoding(&LatLng::new("40.563411", "127.061217").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_null_response());
    assert_eq!(err.to_string(), "처리중 에러가 발생하였습니다.");
}

#[tokio::test]
async fn test_reverse_geocoding_missing_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/reversegeocoding"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"addressInfo": {"fullAddress": ""}})),
        )
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let err = tmap
        .reverse_geocoding(&LatLng::new("40.563411", "127.061217").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::NullResponse));
}

#[tokio::test]
async fn test_convert_address_to_new() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/convertAddress"))
        .and(query_param("searchTypCd", "OtoN"))
        .and(query_param("reqAdd", "경상북도 울진군 후포면 후포리 581-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ConvertAdd": {
                "upperDistName": "경북",
                "newAddressList": {
                    "newAddress": [
                        {"fullAddress": "경북 울진군 후포면 울진대게로 169-69"},
                        {"fullAddress": "경북 울진군 후포면 울진대게로 169-70"}
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let address = tmap
        .convert_address("경상북도 울진군 후포면 후포리 581-15", AddressType::New)
        .await
        .unwrap();

    assert_eq!(address, "경북 울진군 후포면 울진대게로 169-69");
}

#[tokio::test]
async fn test_convert_address_to_old() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/convertAddress"))
        .and(query_param("searchTypCd", "NtoO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ConvertAdd": {
                "oldAddressList": {
                    "oldAddress": [{"fullAddress": "전북 고창군 아산면 삼인리 45"}]
                }
            }
        })))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let address = tmap
        .convert_address("전북 고창군 아산면 선운사로 39-8", AddressType::Old)
        .await
        .unwrap();

    assert_eq!(address, "전북 고창군 아산면 삼인리 45");
}

#[tokio::test]
async fn test_convert_address_no_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmap/geo/convertAddress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ConvertAdd": {}})))
        .mount(&server)
        .await;

    let tmap = TMap::new(common::tmap_api(&server));
    let err = tmap
        .convert_address("어딘가", AddressType::New)
        .await
        .unwrap_err();

    assert!(err.is_null_response());
}
