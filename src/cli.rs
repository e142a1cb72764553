use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jurnal")]
#[command(about = "Jurnal Bimbingan Individu: catatan sesi bimbingan dengan tanda tangan", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tampilkan log rinci
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// File data (mengganti konfigurasi)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Isi jurnal baru secara interaktif (draf disimpan otomatis)
    New {
        /// Tanda tangan siswa (.json goresan, .png atau .jpg)
        #[arg(long)]
        student_sig: Option<PathBuf>,

        /// Tanda tangan guru (.json goresan, .png atau .jpg)
        #[arg(long)]
        teacher_sig: Option<PathBuf>,
    },

    /// Simpan jurnal dari file JSON form
    Save {
        /// File JSON berisi field form
        #[arg(short, long)]
        input: PathBuf,

        /// Tanda tangan siswa
        #[arg(long)]
        student_sig: Option<PathBuf>,

        /// Tanda tangan guru
        #[arg(long)]
        teacher_sig: Option<PathBuf>,
    },

    /// Tampilkan riwayat bimbingan
    List {
        /// Cari berdasarkan nama siswa atau kelas
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Tampilkan detail satu jurnal
    Show {
        key: String,
    },

    /// Buat dokumen HTML siap cetak
    Print {
        #[arg(required_unless_present = "draft")]
        key: Option<String>,

        /// Cetak draf yang sedang diisi
        #[arg(long, conflicts_with = "key")]
        draft: bool,

        /// File HTML keluaran (default: jurnal-<nama>-<tanggal>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Hapus satu jurnal
    Delete {
        key: String,

        /// Lewati konfirmasi
        #[arg(short, long)]
        yes: bool,
    },

    /// Hapus semua riwayat
    Clear {
        /// Lewati konfirmasi
        #[arg(short, long)]
        yes: bool,
    },

    /// Kelola draf tersimpan
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Pindahkan data format lama ke format saat ini
    Migrate,

    /// Konfigurasi
    Config {
        /// Tampilkan konfigurasi saat ini
        #[arg(long)]
        show: bool,

        /// Atur file data
        #[arg(long = "set-data-file")]
        set_data_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DraftAction {
    /// Tampilkan isi draf
    Show,
    /// Hapus draf
    Clear,
}
