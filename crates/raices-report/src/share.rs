//! Outbound share link shown after an export

use url::form_urlencoded;

/// Default message shared alongside a reading
pub const SHARE_MESSAGE: &str = "Hola, comparto mi lectura de Raíces del Ser.";

/// WhatsApp link pre-filled with `message`
pub fn share_link(message: &str) -> String {
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/?text={}", text)
}
