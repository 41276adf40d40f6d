//! Descriptor resolution and channel establishment.

use crate::domain::channel::{Channel, EventSender};
use crate::domain::connection::ServiceEndpoint;
use crate::error::{Error, Resource, Result};
use crate::infrastructure::bluetooth::stack::BluetoothStack;
use crate::infrastructure::bluetooth::streams::{
    is_read_capable, is_write_capable, CharacteristicInputStream, CharacteristicOutputStream,
};
use tracing::{debug, info};

/// Resolves a Classic device id to its RFCOMM endpoint through the stack.
pub(crate) async fn resolve_classic_endpoint<S: BluetoothStack>(
    stack: &S,
    device_id: &str,
) -> Result<ServiceEndpoint> {
    let endpoint = stack.resolve_serial_endpoint(device_id).await?;
    debug!("Resolved serial endpoint {} for {}", endpoint, device_id);
    Ok(endpoint)
}

/// Resolves a BLE descriptor to a characteristic-backed channel: the first
/// write-capable characteristic becomes the outbound half, the first
/// read/notify-capable one the inbound half. One characteristic may serve
/// as both.
pub(crate) async fn open_characteristic_channel<S: BluetoothStack>(
    stack: &S,
    device_id: &str,
    service_uuid: Option<&str>,
    events: Option<EventSender>,
) -> Result<Channel> {
    let handles = stack.ble_characteristics(device_id, service_uuid).await?;

    let output = handles
        .iter()
        .find(|handle| is_write_capable(handle.properties))
        .ok_or(Error::Resolution(Resource::WriteCharacteristic))?;
    let input = handles
        .iter()
        .find(|handle| is_read_capable(handle.properties))
        .ok_or(Error::Resolution(Resource::ReadCharacteristic))?;

    info!(
        "Paired characteristics for {}: write {:#06x}, read {:#06x}",
        device_id, output.properties, input.properties
    );

    let mut reader = CharacteristicInputStream::new(input.io.clone());
    let mut writer = CharacteristicOutputStream::new(output.io.clone());
    if let Some(events) = events {
        reader = reader.with_events(events.clone());
        writer = writer.with_events(events);
    }

    Ok(Channel::new(Box::new(reader), Box::new(writer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::fake::FakeStack;
    use crate::infrastructure::bluetooth::streams::props;

    #[tokio::test]
    async fn missing_write_characteristic_aborts_resolution() {
        let stack = FakeStack::new().with_characteristics("ble-1", vec![props::READ]);

        let err = open_characteristic_channel(&stack, "ble-1", None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Resolution(Resource::WriteCharacteristic)
        ));
    }

    #[tokio::test]
    async fn missing_read_characteristic_aborts_resolution() {
        let stack = FakeStack::new().with_characteristics("ble-1", vec![props::WRITE]);

        let err = open_characteristic_channel(&stack, "ble-1", None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Resolution(Resource::ReadCharacteristic)
        ));
    }

    #[tokio::test]
    async fn distinct_characteristics_form_a_channel() {
        let stack = FakeStack::new().with_characteristics(
            "ble-1",
            vec![props::WRITE_WITHOUT_RESPONSE, props::NOTIFY],
        );

        assert!(open_characteristic_channel(&stack, "ble-1", None, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn one_characteristic_can_serve_both_halves() {
        let stack =
            FakeStack::new().with_characteristics("ble-1", vec![props::READ | props::WRITE]);

        assert!(open_characteristic_channel(&stack, "ble-1", None, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_device_surfaces_the_stack_error() {
        let stack = FakeStack::new();

        let err = open_characteristic_channel(&stack, "missing", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Resolution(Resource::BleDevice)));
    }
}
