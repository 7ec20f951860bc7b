//! HTTP client wrapper for the portal API
//!
//! Each method maps to one route and returns the raw response, so tests can
//! assert on status codes as well as bodies. Routes change in one place only.

use super::constants::*;
use reqwest::{multipart, Client, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for making requests to the test server
///
/// Cookies are kept between requests, so a client that logged in stays logged in.
pub struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the seeded student
    pub async fn authenticated(base_url: String) -> Self {
        Self::logged_in(base_url, TEST_USER, TEST_PASS).await
    }

    /// Creates a client logged in as the second seeded student
    pub async fn authenticated_other(base_url: String) -> Self {
        Self::logged_in(base_url, OTHER_USER, OTHER_PASS).await
    }

    /// Creates a client logged in as the seeded administrator
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::logged_in(base_url, ADMIN_USER, ADMIN_PASS).await
    }

    async fn logged_in(base_url: String, email: &str, password: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(email, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Login as {} failed",
            email
        );
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Auth Endpoints
    // ========================================================================

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/v1/auth/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    pub async fn logout(&self) -> Response {
        self.client
            .get(self.url("/v1/auth/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    pub async fn register(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/v1/auth/register"))
            .json(body)
            .send()
            .await
            .expect("Register request failed")
    }

    // ========================================================================
    // Home and Profile
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn get_profile(&self) -> Response {
        self.client
            .get(self.url("/v1/user/profile"))
            .send()
            .await
            .expect("Profile request failed")
    }

    pub async fn update_profile(&self, body: &Value) -> Response {
        self.client
            .put(self.url("/v1/user/profile"))
            .json(body)
            .send()
            .await
            .expect("Profile update request failed")
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Response {
        self.client
            .put(self.url("/v1/user/password"))
            .json(&serde_json::json!({
                "old_password": old_password,
                "new_password": new_password,
            }))
            .send()
            .await
            .expect("Password change request failed")
    }

    // ========================================================================
    // Catalog and Documents
    // ========================================================================

    pub async fn get_catalog(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/v1/catalog"))
            .query(query)
            .send()
            .await
            .expect("Catalog request failed")
    }

    pub async fn get_all_documents(&self) -> Response {
        self.client
            .get(self.url("/v1/documents/all"))
            .send()
            .await
            .expect("All documents request failed")
    }

    pub async fn upload_document(
        &self,
        subject: &str,
        branch: &str,
        category: &str,
        filetype: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Response {
        let file_part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("subject", subject.to_string())
            .text("branch", branch.to_string())
            .text("category", category.to_string())
            .text("filetype", filetype.to_string())
            .text("description", "Uploaded by the test suite")
            .part("file", file_part);

        self.client
            .post(self.url("/v1/documents"))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    pub async fn my_documents(&self, page: Option<&str>) -> Response {
        let mut request = self.client.get(self.url("/v1/documents/mine"));
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }
        request.send().await.expect("My documents request failed")
    }

    pub async fn delete_document(&self, id: usize) -> Response {
        self.client
            .delete(self.url(&format!("/v1/documents/{}", id)))
            .send()
            .await
            .expect("Delete document request failed")
    }

    pub async fn download_document(&self, id: usize) -> Response {
        self.client
            .get(self.url(&format!("/v1/documents/{}/file", id)))
            .send()
            .await
            .expect("Download request failed")
    }

    // ========================================================================
    // Admin Endpoints
    // ========================================================================

    pub async fn admin_stats(&self) -> Response {
        self.client
            .get(self.url("/v1/admin/stats"))
            .send()
            .await
            .expect("Admin stats request failed")
    }

    pub async fn admin_documents(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/v1/admin/documents"))
            .query(query)
            .send()
            .await
            .expect("Admin documents request failed")
    }

    pub async fn set_document_status(&self, id: usize, status: &str) -> Response {
        self.client
            .put(self.url(&format!("/v1/admin/documents/{}/status", id)))
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .expect("Set status request failed")
    }

    pub async fn admin_users(&self, page: Option<&str>) -> Response {
        let mut request = self.client.get(self.url("/v1/admin/users"));
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }
        request.send().await.expect("Admin users request failed")
    }

    pub async fn admin_delete_user(&self, id: usize) -> Response {
        self.client
            .delete(self.url(&format!("/v1/admin/users/{}", id)))
            .send()
            .await
            .expect("Admin delete user request failed")
    }

    pub async fn admin_queries(&self, read: Option<&str>) -> Response {
        let mut request = self.client.get(self.url("/v1/admin/queries"));
        if let Some(read) = read {
            request = request.query(&[("read", read)]);
        }
        request.send().await.expect("Admin queries request failed")
    }

    pub async fn admin_query(&self, id: usize) -> Response {
        self.client
            .get(self.url(&format!("/v1/admin/queries/{}", id)))
            .send()
            .await
            .expect("Admin query request failed")
    }

    // ========================================================================
    // Contact
    // ========================================================================

    pub async fn submit_contact(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/v1/contact"))
            .json(body)
            .send()
            .await
            .expect("Contact request failed")
    }
}
