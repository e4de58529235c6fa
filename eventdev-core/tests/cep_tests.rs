use eventdev_core::cep::{CepLookup, ViaCep};
use eventdev_core::error::EventDevError;
use eventdev_core::event::EventForm;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_lookup_fills_event_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/88015200/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "88015-200",
            "logradouro": "Rua Felipe Schmidt",
            "bairro": "Centro",
            "localidade": "Florianópolis",
            "uf": "SC"
        })))
        .mount(&server)
        .await;

    let viacep = ViaCep::new(format!("{}/ws", server.uri()));
    let lookup = viacep.lookup("88015-200").await.unwrap();
    assert_eq!(lookup.cep, "88015200");
    assert_eq!(lookup.city, "Florianópolis");

    let mut form = EventForm::default();
    form.apply_lookup(&lookup);
    assert_eq!(form.street.as_deref(), Some("Rua Felipe Schmidt"));
    assert_eq!(form.state.as_deref(), Some("SC"));
}

#[tokio::test]
async fn test_unknown_cep_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/00000000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": true })))
        .mount(&server)
        .await;

    let viacep = ViaCep::new(format!("{}/ws/", server.uri()));
    assert!(matches!(
        viacep.lookup("00000-000").await,
        Err(EventDevError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_short_cep_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let viacep = ViaCep::new(format!("{}/ws", server.uri()));
    assert!(matches!(
        viacep.lookup("8801").await,
        Err(EventDevError::Validation(_))
    ));
}
