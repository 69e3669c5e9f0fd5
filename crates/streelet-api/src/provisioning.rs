// Provisioning endpoints
//
// `/configure` pushes WiFi credentials, group and name to a device in
// setup mode. `/wifi` stores the credentials the backend hands out.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{DashboardClient, WIFI_SETUP_PATH};
use crate::error::Error;
use crate::models::ConfigureRequest;

impl DashboardClient {
    /// Configure a device in setup mode.
    ///
    /// `POST /configure` with `{grupo, name}`. Returns the backend's
    /// `message` when present; a 2xx body without one is still a success.
    pub async fn configure(&self, request: &ConfigureRequest) -> Result<Option<String>, Error> {
        let url = self.endpoint(&["configure"])?;
        debug!(group = %request.group, name = %request.name, "submitting configuration");
        let ack = self.post_json(url, request).await?;
        Ok(ack.message)
    }

    /// Store the WiFi credentials the backend provisions devices with.
    ///
    /// `POST /wifi` as a form. The backend answers with a redirect to the
    /// dashboard on success and a plain-text 400 when a field is missing.
    pub async fn set_wifi_credentials(
        &self,
        ssid: &str,
        password: &SecretString,
    ) -> Result<(), Error> {
        let url = self.endpoint(&[WIFI_SETUP_PATH])?;
        debug!(ssid, "storing WiFi credentials");

        let resp = self
            .http()
            .post(url)
            .form(&[("ssid", ssid), ("password", password.expose_secret())])
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        let text = text.trim();
        Err(Error::Backend {
            status: status.as_u16(),
            message: (!text.is_empty()).then(|| text.to_owned()),
        })
    }
}
