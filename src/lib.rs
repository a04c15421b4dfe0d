pub use framewire_core::*;

#[cfg(feature = "codecs")]
pub mod codecs {
    pub use framewire_codecs::*;
}

#[cfg(feature = "transmission")]
pub mod transmission {
    pub use framewire_transmission::*;
}

#[cfg(feature = "profilation")]
pub mod profilation {
    pub use framewire_profilation_utils::*;
}

#[cfg(feature = "bench")]
pub mod bench {
    pub use framewire_bench::*;
}
