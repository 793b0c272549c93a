use serde_json::json;
use truthsense_video::{Sentiment, VideoClient, VideoError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn video_body(duration: &str) -> serde_json::Value {
    json!({
        "items": [{
            "snippet": {
                "title": "Breaking: miracle cure found",
                "description": "Shocking report",
                "channelTitle": "Daily News Network",
                "publishedAt": "2024-05-01T00:00:00Z",
                "thumbnails": {
                    "default": { "url": "https://i.ytimg.com/d.jpg" },
                    "high": { "url": "https://i.ytimg.com/h.jpg" }
                }
            },
            "statistics": {
                "viewCount": "1500000",
                "likeCount": "12000",
                "commentCount": "800"
            },
            "contentDetails": { "duration": duration }
        }]
    })
}

fn comments_body() -> serde_json::Value {
    json!({
        "items": [
            {
                "id": "c1",
                "snippet": { "topLevelComment": { "snippet": {
                    "textDisplay": "this is fake nonsense",
                    "authorDisplayName": "a",
                    "publishedAt": "2024-05-02T00:00:00Z",
                    "likeCount": 3
                }}}
            },
            {
                "id": "c2",
                "snippet": { "topLevelComment": { "snippet": {
                    "textDisplay": "great great reporting",
                    "authorDisplayName": "b",
                    "publishedAt": "2024-05-02T01:00:00Z",
                    "likeCount": 1
                }}}
            }
        ]
    })
}

async fn client_for(server: &MockServer) -> VideoClient {
    VideoClient::new(&format!("{}/", server.uri()), "vk".into()).unwrap()
}

#[tokio::test]
async fn analyze_url_builds_full_insights() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("key", "vk"))
        .and(query_param("part", "snippet,statistics,contentDetails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body("PT4M13S")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("maxResults", "100"))
        .and(query_param("order", "relevance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/captions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let insights = client_for(&server)
        .await
        .analyze_url("https://www.youtube.com/watch?v=abc123")
        .await
        .unwrap();

    assert_eq!(insights.video.id, "abc123");
    assert_eq!(insights.video.view_count, 1_500_000);
    assert!(!insights.video.is_short);
    assert_eq!(insights.video.thumbnail_url, "https://i.ytimg.com/h.jpg");
    assert_eq!(insights.transcript, "No transcript available for this video.");
    assert_eq!(insights.comments.len(), 2);
    assert_eq!(insights.comments[0].sentiment, Sentiment::Negative);
    assert_eq!(insights.comments[1].sentiment, Sentiment::Positive);
    assert_eq!(insights.sentiment.distribution.positive, 1);
    assert_eq!(insights.sentiment.distribution.negative, 1);
}

#[tokio::test]
async fn shorts_get_smaller_comment_budget_and_short_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body("PT45S")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/captions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let insights = client_for(&server)
        .await
        .analyze_url("https://www.youtube.com/shorts/xyz987")
        .await
        .unwrap();

    assert!(insights.video.is_short);
    assert!(insights.transcript.starts_with("No transcript available for this Short."));
    assert_eq!(insights.sentiment.overall, Sentiment::Neutral);
}

#[tokio::test]
async fn disabled_comments_degrade_to_empty_section() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body("PT2M")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "message": "commentsDisabled" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/captions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "track1" }]
        })))
        .mount(&server)
        .await;

    let insights = client_for(&server)
        .await
        .analyze_url("https://youtu.be/abc123")
        .await
        .unwrap();

    assert!(insights.comments.is_empty());
    assert!(insights.transcript.contains("yt-dlp"));
}

#[tokio::test]
async fn missing_video_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .analyze_url("https://youtu.be/gone404")
        .await
        .unwrap_err();
    assert!(matches!(err, VideoError::NotFound(_)));
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .await
        .analyze_url("https://vimeo.com/1")
        .await
        .unwrap_err();
    assert!(matches!(err, VideoError::InvalidUrl(_)));
}
