//! Temperature port — the terrarium temperature reading.

/// Provides the current terrarium temperature in whole degrees.
///
/// `None` means no usable reading (sensor failure, stale value). The
/// temperature engine treats it as "no trigger this tick".
pub trait TemperatureProvider {
    fn terrarium_temperature(&self) -> Option<i32>;
}

impl<T: TemperatureProvider + ?Sized> TemperatureProvider for std::sync::Arc<T> {
    fn terrarium_temperature(&self) -> Option<i32> {
        (**self).terrarium_temperature()
    }
}
