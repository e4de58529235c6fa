use chrono::NaiveDate;
use eventdev_core::api::ApiClient;
use eventdev_core::community::CommunityForm;
use eventdev_core::error::EventDevError;
use eventdev_core::event::{EventForm, Modality};
use eventdev_core::screen::{CommunityScreen, HomeScreen};
use eventdev_core::view::{ModalityFilter, UpcomingFilter};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/api/v1", server.uri())).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
}

async fn mount_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Async Rust", "start_date_time": "2030-03-01T19:00:00Z",
              "modality": "ONLINE", "id_community": 10 },
            { "id": 2, "title": "Meetup SP", "start_date_time": "2030-02-01T19:00:00Z",
              "modality": "PRESENTIAL", "id_community": 10, "id_address": 100 },
            { "id": 3, "title": "Go Talks", "start_date_time": "2030-01-15T19:00:00Z",
              "modality": "HYBRID", "id_community": 20 }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/community"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 10, "name": "Rust Brasil", "slug": "rust-br" },
            { "id": 20, "name": "Go SP" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 100, "city": "São Paulo", "state": "SP" }
        ])))
        .mount(server)
        .await;
}

async fn loaded_screen(server: &MockServer) -> CommunityScreen {
    mount_sources(server).await;
    let mut screen = CommunityScreen::new(api(server), "rust-br");
    assert!(screen.load().await.unwrap());
    screen
}

#[tokio::test]
async fn test_home_screen_upcoming() {
    let server = MockServer::start().await;
    mount_sources(&server).await;

    let mut home = HomeScreen::new(api(&server));
    assert!(home.load().await.unwrap());

    let now = "2030-01-01T00:00:00Z".parse().unwrap();
    let ids: Vec<_> = home
        .upcoming(now, UpcomingFilter::All, 4)
        .iter()
        .map(|e| e.id())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let online: Vec<_> = home
        .upcoming(now, UpcomingFilter::Online, 4)
        .iter()
        .map(|e| e.id())
        .collect();
    assert_eq!(online, vec![3, 1]);
}

#[tokio::test]
async fn test_closed_home_screen_drops_load() {
    let server = MockServer::start().await;
    mount_sources(&server).await;

    let mut home = HomeScreen::new(api(&server));
    home.close();
    assert!(!home.load().await.unwrap());
    assert!(home.events().is_empty());
}

#[tokio::test]
async fn test_community_screen_filters_by_modality() {
    let server = MockServer::start().await;
    let screen = loaded_screen(&server).await;

    assert_eq!(screen.community().unwrap().id, 10);
    assert_eq!(screen.events(ModalityFilter::All).len(), 2);
    let presential = screen.events(ModalityFilter::Presential);
    assert_eq!(presential.len(), 1);
    assert_eq!(
        presential[0].address.as_ref().unwrap().city.as_deref(),
        Some("São Paulo")
    );
}

#[tokio::test]
async fn test_delete_event_success_removes_locally() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/event/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    screen.delete_event(2).await.unwrap();
    let ids: Vec<_> = screen.events(ModalityFilter::All).iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_delete_event_failure_leaves_state() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/event/2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    let err = screen.delete_event(2).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(screen.events(ModalityFilter::All).len(), 2);
}

#[tokio::test]
async fn test_update_event_replaces_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/event/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "title": "Async Rust II", "start_date_time": "2030-03-02T19:00:00",
            "modality": "HYBRID", "id_community": 10, "id_address": 100
        })))
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    let mut form = EventForm::from_event(&screen.event(1).unwrap().event, None);
    form.title = "Async Rust II".into();
    form.description = "Tokio internals".into();
    form.date = "2030-03-02".into();
    form.start_time = "19:00".into();
    form.end_time = "21:00".into();
    form.modality = Some(Modality::Hybrid);
    form.cep = Some("01001-000".into());
    form.street = Some("Praça da Sé".into());
    form.number = Some("1".into());
    form.neighborhood = Some("Sé".into());
    form.city = Some("São Paulo".into());
    form.state = Some("SP".into());

    let updated = screen.update_event(1, &form, today()).await.unwrap();
    assert_eq!(updated.event.title, "Async Rust II");
    assert_eq!(updated.modality_key, "hybrid");
    assert!(updated.address.is_some());

    let ids: Vec<_> = screen.events(ModalityFilter::All).iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_update_event_picks_up_new_venue() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/event/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2, "title": "Meetup Recife", "start_date_time": "2030-02-01T19:00:00",
            "modality": "PRESENTIAL", "id_community": 10, "id_address": 200,
            "address": { "id": 200, "city": "Recife", "state": "PE", "cep": "50030-230" }
        })))
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    let mut form = EventForm::from_event(&screen.event(2).unwrap().event, None);
    form.title = "Meetup Recife".into();
    form.description = "Moved north".into();
    form.date = "2030-02-01".into();
    form.start_time = "19:00".into();
    form.end_time = "21:00".into();
    form.modality = Some(Modality::Presential);
    form.cep = Some("50030-230".into());
    form.street = Some("Rua da Aurora".into());
    form.number = Some("10".into());
    form.neighborhood = Some("Boa Vista".into());
    form.city = Some("Recife".into());
    form.state = Some("PE".into());

    let updated = screen.update_event(2, &form, today()).await.unwrap();
    assert_eq!(updated.address.as_ref().unwrap().city.as_deref(), Some("Recife"));
    assert!(updated.event.address.is_none());
}

#[tokio::test]
async fn test_create_event_appends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/event/10"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9, "title": "New", "start_date_time": "2030-04-01T10:00:00",
            "modality": "ONLINE", "id_community": 10
        })))
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    let form = EventForm {
        title: "New".into(),
        description: "Fresh".into(),
        date: "2030-04-01".into(),
        start_time: "10:00".into(),
        end_time: "12:00".into(),
        modality: Some(Modality::Online),
        ..Default::default()
    };
    let created = screen.create_event(&form, today()).await.unwrap();
    assert_eq!(created.community.as_ref().unwrap().name, "Rust Brasil");
    assert_eq!(screen.events(ModalityFilter::Online).len(), 2);
}

#[tokio::test]
async fn test_invalid_event_form_is_rejected_locally() {
    let server = MockServer::start().await;
    let mut screen = loaded_screen(&server).await;

    let form = EventForm::default();
    let err = screen.create_event(&form, today()).await.unwrap_err();
    assert!(matches!(err, EventDevError::Validation(_)));
    assert_eq!(screen.events(ModalityFilter::All).len(), 2);
}

#[tokio::test]
async fn test_update_and_delete_community() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/community/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 10, "name": "Rust Brasil Oficial", "slug": "rust-brasil-oficial"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/community/10"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let mut screen = loaded_screen(&server).await;

    let mut form = CommunityForm::from_community(screen.community().unwrap());
    form.name = "Rust Brasil Oficial".into();
    screen.update_community(&form).await.unwrap();
    assert_eq!(
        screen.events(ModalityFilter::All)[0]
            .community
            .as_ref()
            .unwrap()
            .name,
        "Rust Brasil Oficial"
    );

    screen.delete_community().await.unwrap();
    assert!(screen.community().is_none());
    assert!(screen.events(ModalityFilter::All).is_empty());
}

#[tokio::test]
async fn test_unknown_community_key() {
    let server = MockServer::start().await;
    mount_sources(&server).await;

    let mut screen = CommunityScreen::new(api(&server), "elixir-br");
    assert!(matches!(
        screen.load().await,
        Err(EventDevError::NotFound(_))
    ));
    assert!(screen.community().is_none());
}
