use utoipa::OpenApi;

/// API documentation of every route mounted under `/api`
#[derive(OpenApi)]
#[openapi(
    info(title = "Notification API", description = "Contact details and email verification"),
    nest(
        (path = "/api/contactDetails", api = domain_contact_details::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
