use serde::{Deserialize, Serialize};

/// Budget for the spectral entropy proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Largest node count solved exactly (dense Jacobi).
    pub exact_limit: usize,
    /// Lanczos steps used above `exact_limit`.
    pub lanczos_k: usize,
    /// Jacobi sweep cap.
    pub max_sweeps: usize,
    /// Off-diagonal convergence tolerance.
    pub tolerance: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            exact_limit: 192,
            lanczos_k: 64,
            max_sweeps: 64,
            tolerance: 1e-10,
        }
    }
}

impl SpectralConfig {
    /// Larger exact region and more Lanczos steps.
    pub fn strict() -> Self {
        Self {
            exact_limit: 256,
            lanczos_k: 96,
            max_sweeps: 96,
            tolerance: 1e-12,
        }
    }

    /// Cheaper approximation for very large or very frequent evaluations.
    pub fn lenient() -> Self {
        Self {
            exact_limit: 96,
            lanczos_k: 32,
            max_sweeps: 32,
            tolerance: 1e-8,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralConfig {
    pub spectral: SpectralConfig,
}

impl StructuralConfig {
    pub fn strict() -> Self {
        Self {
            spectral: SpectralConfig::strict(),
        }
    }

    pub fn lenient() -> Self {
        Self {
            spectral: SpectralConfig::lenient(),
        }
    }
}

/// Windowing of the interaction stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Events per window.
    pub window_size: usize,
    /// Events the window advances by. `0` means `window_size`.
    pub stride: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            stride: 0,
        }
    }
}

impl StreamConfig {
    /// Short windows react to drift sooner.
    pub fn strict() -> Self {
        Self {
            window_size: 10,
            stride: 0,
        }
    }

    pub fn lenient() -> Self {
        Self {
            window_size: 40,
            stride: 0,
        }
    }

    pub fn effective_window(&self) -> usize {
        self.window_size.max(1)
    }

    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.effective_window()
        } else {
            self.stride
        }
    }
}
