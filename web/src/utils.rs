use gloo::storage::{LocalStorage, Storage};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Types persisted in `LocalStorage` under a fixed, versioned key.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

pub(crate) trait LocalOrDefault: Sized {
    /// Reads the stored value, falling back to `Default` when it is missing or unreadable.
    fn local_or_default() -> Self;

    fn local_save(&self);
}

impl<T: StorageKey + Default + Serialize + DeserializeOwned> LocalOrDefault for T {
    fn local_or_default() -> Self {
        LocalStorage::get(T::KEY).unwrap_or_else(|err| {
            log::debug!("no usable {}: {}", T::KEY, err);
            T::default()
        })
    }

    fn local_save(&self) {
        if let Err(err) = LocalStorage::set(T::KEY, self) {
            log::error!("could not save {} to local storage: {:?}", T::KEY, err);
        }
    }
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([(); 8].map(|_| (256. * random()) as u8))
}

/// Seed from the `--seed` argument: a number is used as is, any other text
/// goes through 64-bit FNV-1a.
pub(crate) fn seed_from_arg(arg: &str) -> u64 {
    arg.parse().unwrap_or_else(|_| {
        arg.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
    })
}
