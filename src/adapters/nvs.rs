//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigStore`]: the whole settings text lives in one blob
//! under namespace `cncrelay`, key `config`.
//!
//! - **`target_os = "espidf"`**: `nvs_get_blob` / `nvs_set_blob` on the
//!   default partition, committed with `nvs_commit()`.
//! - **host**: the blob is held in memory.
//!
//! If flash initialisation fails at boot the firmware keeps running with
//! an [`NvsConfigStore::unavailable`] store: every load and save then
//! fails with [`StorageError::Unavailable`].

use crate::app::ports::{ConfigStore, StorageError};
use log::{info, warn};

/// Upper bound on the persisted blob; the full settings text is far smaller.
const MAX_BLOB_SIZE: usize = 4000;

pub struct NvsConfigStore {
    available: bool,
    #[cfg(not(target_os = "espidf"))]
    blob: Option<Vec<u8>>,
}

impl NvsConfigStore {
    /// Initialise NVS flash and return a usable store.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            flash::init().map_err(|e| {
                warn!("NvsConfigStore: flash init failed: {}", e);
                StorageError::Unavailable
            })?;
            info!("NvsConfigStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: simulation backend");

        Ok(Self {
            available: true,
            #[cfg(not(target_os = "espidf"))]
            blob: None,
        })
    }

    /// A store whose backend failed to initialise.
    pub fn unavailable() -> Self {
        warn!("NvsConfigStore: running without persistent storage");
        Self {
            available: false,
            #[cfg(not(target_os = "espidf"))]
            blob: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

fn decode(bytes: Vec<u8>) -> Result<String, StorageError> {
    String::from_utf8(bytes).map_err(|_| StorageError::Corrupted)
}

impl ConfigStore for NvsConfigStore {
    fn read_config(&self) -> Result<String, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }

        #[cfg(not(target_os = "espidf"))]
        let bytes = self.blob.clone().ok_or(StorageError::NotFound)?;

        #[cfg(target_os = "espidf")]
        let bytes = flash::read_blob()?;

        info!("NvsConfigStore: loaded config ({} bytes)", bytes.len());
        decode(bytes)
    }

    fn write_config(&mut self, contents: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        if contents.len() > MAX_BLOB_SIZE {
            return Err(StorageError::Full);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.blob = Some(contents.as_bytes().to_vec());
        }

        #[cfg(target_os = "espidf")]
        flash::write_blob(contents.as_bytes())?;

        info!("NvsConfigStore: config saved ({} bytes)", contents.len());
        Ok(())
    }
}

/// Raw ESP-IDF NVS calls for the single config blob.
#[cfg(target_os = "espidf")]
mod flash {
    use esp_idf_svc::sys::{self, EspError, esp, esp_err_t, nvs_handle_t, nvs_open_mode_t};
    use log::warn;

    use super::MAX_BLOB_SIZE;
    use crate::app::ports::StorageError;

    const NAMESPACE: &[u8] = b"cncrelay\0";
    const KEY: &[u8] = b"config\0";

    /// Bring up the default partition, erasing it when it is full or was
    /// written by a newer NVS version.
    pub fn init() -> Result<(), EspError> {
        // SAFETY: called once from the main task before any NVS access.
        match esp!(unsafe { sys::nvs_flash_init() }) {
            Err(e)
                if e.code() == sys::ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                    || e.code() == sys::ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t =>
            {
                warn!("NVS: erasing and re-initialising flash partition");
                esp!(unsafe { sys::nvs_flash_erase() })?;
                esp!(unsafe { sys::nvs_flash_init() })
            }
            other => other,
        }
    }

    /// Open namespace handle; closed on drop.
    struct Handle(nvs_handle_t);

    impl Handle {
        fn open(mode: nvs_open_mode_t) -> Result<Self, EspError> {
            let mut raw: nvs_handle_t = 0;
            // SAFETY: NAMESPACE is NUL-terminated and outlives the call.
            esp!(unsafe { sys::nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut raw) })?;
            Ok(Self(raw))
        }
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            // SAFETY: the handle came from a successful nvs_open.
            unsafe { sys::nvs_close(self.0) }
        }
    }

    fn storage_error(e: EspError) -> StorageError {
        // A namespace that was never written cannot be opened read-only.
        if e.code() == sys::ESP_ERR_NVS_NOT_FOUND as esp_err_t {
            StorageError::NotFound
        } else if e.code() == sys::ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t {
            StorageError::Full
        } else {
            warn!("NvsConfigStore: NVS error {}", e);
            StorageError::IoError
        }
    }

    pub fn read_blob() -> Result<Vec<u8>, StorageError> {
        let handle = Handle::open(sys::nvs_open_mode_t_NVS_READONLY).map_err(storage_error)?;

        let mut size: usize = 0;
        // SAFETY: a null buffer asks NVS for the stored length only.
        esp!(unsafe {
            sys::nvs_get_blob(handle.0, KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
        })
        .map_err(storage_error)?;
        if size > MAX_BLOB_SIZE {
            return Err(StorageError::Corrupted);
        }

        let mut buf = vec![0u8; size];
        // SAFETY: `buf` holds exactly `size` bytes.
        esp!(unsafe {
            sys::nvs_get_blob(handle.0, KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
        })
        .map_err(storage_error)?;
        buf.truncate(size);
        Ok(buf)
    }

    pub fn write_blob(bytes: &[u8]) -> Result<(), StorageError> {
        let handle = Handle::open(sys::nvs_open_mode_t_NVS_READWRITE).map_err(storage_error)?;
        // SAFETY: KEY is NUL-terminated; `bytes` is valid for its length.
        esp!(unsafe {
            sys::nvs_set_blob(handle.0, KEY.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
        })
        .map_err(storage_error)?;
        esp!(unsafe { sys::nvs_commit(handle.0) }).map_err(storage_error)
    }
}
