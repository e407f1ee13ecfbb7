//! Static checkpoint registry.
//!
//! Maps network-variant identifiers to checkpoint files, and checkpoint files
//! to their expected MD5 digest and cloud-drive URL. Everything here is a
//! `match` over a closed enum, so a checkpoint without a digest or URL does
//! not compile.

use crate::error::ResolveError;
use std::fmt;
use std::str::FromStr;

/// Base URL the HTTP tool joins checkpoint file names onto.
pub const DEFAULT_BASE_URL: &str = "https://www.cs.cmu.edu/~sige/resources/models/diffusion";

/// Network variants a run config may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    DdpmUnet,
    DdpmFusedUnet,
    DdpmSigeFusedUnet,
    PdUnet,
    PdSigeUnet,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::DdpmUnet,
        Variant::DdpmFusedUnet,
        Variant::DdpmSigeFusedUnet,
        Variant::PdUnet,
        Variant::PdSigeUnet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::DdpmUnet => "ddpm.unet",
            Variant::DdpmFusedUnet => "ddpm.fused_unet",
            Variant::DdpmSigeFusedUnet => "ddpm.sige_fused_unet",
            Variant::PdUnet => "pd.unet",
            Variant::PdSigeUnet => "pd.sige_unet",
        }
    }

    /// Checkpoint file holding this variant's weights. The SIGE variants reuse
    /// the weights of the network they are converted from.
    pub fn checkpoint(self) -> Checkpoint {
        match self {
            Variant::DdpmUnet => Checkpoint::Church256DdpmUnet,
            Variant::DdpmFusedUnet | Variant::DdpmSigeFusedUnet => {
                Checkpoint::Church256DdpmFusedUnet
            }
            Variant::PdUnet | Variant::PdSigeUnet => Checkpoint::Church128PdUnet,
        }
    }
}

impl FromStr for Variant {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ResolveError::UnsupportedVariant(s.to_string()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checkpoint files known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    Church128PdUnet,
    Church256DdpmFusedUnet,
    Church256DdpmUnet,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 3] = [
        Checkpoint::Church128PdUnet,
        Checkpoint::Church256DdpmFusedUnet,
        Checkpoint::Church256DdpmUnet,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Checkpoint::Church128PdUnet => "church128-pd-unet.pth",
            Checkpoint::Church256DdpmFusedUnet => "church256-ddpm-fused_unet.pth",
            Checkpoint::Church256DdpmUnet => "church256-ddpm-unet.pth",
        }
    }

    /// Expected MD5 of the file content, lowercase hex.
    pub fn md5(self) -> &'static str {
        match self {
            Checkpoint::Church128PdUnet => "8a2690eb25d1e2b5367e9574d7b73822",
            Checkpoint::Church256DdpmFusedUnet => "fb3e26e5e6be812d6bed5c48e5265506",
            Checkpoint::Church256DdpmUnet => "8fbd43a27e98e64b56453faca9be619e",
        }
    }

    pub fn gdrive_url(self) -> &'static str {
        match self {
            Checkpoint::Church128PdUnet => {
                "https://drive.google.com/u/0/uc?id=12kotBI8V1Cv2tmUt6I-fwjD_x63Rhmhs"
            }
            Checkpoint::Church256DdpmFusedUnet => {
                "https://drive.google.com/u/0/uc?id=1DEKOPquaPOsMSx0iskA73VtzVqVg_oHO"
            }
            Checkpoint::Church256DdpmUnet => {
                "https://drive.google.com/u/0/uc?id=1YiEO85VvV2OJbr1ueZomznyL_pO9Lmwy"
            }
        }
    }

    /// `<base_url>/<file_name>`, tolerating a trailing slash on the base.
    pub fn http_url(self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name())
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
