// Device endpoints
//
// Listing, power commands, deletion, and manual registration.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{NewDevice, PowerAction, RawDevice};

impl DashboardClient {
    /// List all registered devices.
    ///
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<RawDevice>, Error> {
        let url = self.endpoint(&["devices"])?;
        self.get_json(url).await
    }

    /// Send a power command to a device and return the backend's message.
    ///
    /// `POST /devices/{id}/power/{on|off}`. A 2xx body with `error` instead
    /// of `message` is reported as [`Error::Rejected`].
    pub async fn set_power(&self, id: &str, action: PowerAction) -> Result<String, Error> {
        let url = self.endpoint(&["devices", id, "power", action.as_ref()])?;
        debug!(id, %action, "sending power command");
        self.post_empty(url).await?.into_message()
    }

    /// Delete a device.
    ///
    /// `POST /devices/{id}/delete`. The backend also sends the device a
    /// reset message before removing it.
    pub async fn delete_device(&self, id: &str) -> Result<String, Error> {
        let url = self.endpoint(&["devices", id, "delete"])?;
        debug!(id, "deleting device");
        self.post_empty(url).await?.into_message()
    }

    /// Register a device manually.
    ///
    /// `POST /devices` with `{device_id, name?, topic, ip?}`. Answers 409
    /// when the id is already registered.
    pub async fn add_device(&self, device: &NewDevice) -> Result<String, Error> {
        let url = self.endpoint(&["devices"])?;
        debug!(device_id = %device.device_id, topic = %device.topic, "registering device");
        self.post_json(url, device).await?.into_message()
    }
}
