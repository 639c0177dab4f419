//! Audio dataset preprocessing: metadata indexing, deterministic
//! train/val/test splitting, ordered transform pipelines and `.npy` export.

pub mod audio {
    pub mod domain {
        pub mod audio_source;
        pub mod signal;
        pub mod transform;
    }
    pub mod infrastructure {
        pub mod add_noise;
        pub mod normalize;
        pub mod pitch_shift;
        pub mod resampler;
        pub mod silence_trim;
        mod stft;
        pub mod time_stretch;
    }
}

pub mod dataset {
    pub mod domain {
        pub mod dataset_index;
        pub mod metadata_reader;
        pub mod metadata_record;
        pub mod split_ratios;
    }
    pub mod infrastructure {
        pub mod csv_metadata_reader;
    }
}

pub mod media {
    pub mod domain {
        pub mod audio_decoder;
        pub mod signal_writer;
    }
    pub mod infrastructure {
        pub mod npy_writer;
        pub mod symphonia_decoder;
    }
}

pub mod pipeline {
    pub mod pipeline_factory;
    pub mod pipeline_logger;
    pub mod preprocess_dataset_use_case;
    pub mod transform_pipeline;
}

pub mod shared {
    pub mod config;
    pub mod constants;
}
