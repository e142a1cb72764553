use thiserror::Error;

#[derive(Error, Debug)]
pub enum JurnalError {
    #[error("{0}")]
    Core(#[from] jurnal_common::Error),

    #[error("Kesalahan konfigurasi: {0}")]
    Config(String),

    #[error("File tidak ditemukan: {0}")]
    FileNotFound(String),

    #[error("Format tanda tangan tidak didukung: {0} (gunakan .json, .png atau .jpg)")]
    UnsupportedSignature(String),

    #[error("Gagal membaca gambar tanda tangan: {0}")]
    ImageLoad(String),

    #[error("Data input tidak valid: {0:#}")]
    Input(#[from] anyhow::Error),

    #[error("Kesalahan JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Kesalahan IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Kesalahan input terminal: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Tugas latar belakang gagal: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, JurnalError>;
