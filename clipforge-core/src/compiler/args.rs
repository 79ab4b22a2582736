//! Fluent assembly of the encoder argument vector.
//!
//! Argument order is fixed: overwrite flag, seek bounds, inputs, filter
//! graph (complex or per-stream), audio filters, stream maps, codecs,
//! verbatim extras, then the output path. Seek bounds precede the
//! inputs so trimming happens at demux time, not as a filter stage.

/// Audio handling for the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutput {
    /// Strip audio entirely (`-an`).
    Disabled,
    /// Encode (or copy) with the given codec; bitrate applies only when
    /// transcoding.
    Encode {
        codec: String,
        bitrate_k: Option<u32>,
    },
}

/// Builder for the encoder argument vector.
#[derive(Debug, Clone)]
pub struct CommandArgs {
    overwrite: bool,
    seek_start: Option<String>,
    seek_end: Option<String>,
    inputs: Vec<String>,
    filter_complex: Option<String>,
    video_filters: Vec<String>,
    audio_filters: Vec<String>,
    maps: Vec<String>,
    video_codec: String,
    preset: Option<String>,
    crf: Option<u8>,
    audio: AudioOutput,
    extra_args: Vec<String>,
    output: String,
}

impl Default for CommandArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandArgs {
    #[must_use]
    pub fn new() -> Self {
        Self {
            overwrite: true,
            seek_start: None,
            seek_end: None,
            inputs: Vec::new(),
            filter_complex: None,
            video_filters: Vec::new(),
            audio_filters: Vec::new(),
            maps: Vec::new(),
            video_codec: String::new(),
            preset: None,
            crf: None,
            audio: AudioOutput::Disabled,
            extra_args: Vec::new(),
            output: String::new(),
        }
    }

    #[must_use]
    pub fn input(mut self, path: impl Into<String>) -> Self {
        self.inputs.push(path.into());
        self
    }

    #[must_use]
    pub fn seek(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.seek_start = start;
        self.seek_end = end;
        self
    }

    #[must_use]
    pub fn video_filter(mut self, filter: String) -> Self {
        if !filter.is_empty() {
            self.video_filters.push(filter);
        }
        self
    }

    #[must_use]
    pub fn audio_filter(mut self, filter: String) -> Self {
        if !filter.is_empty() {
            self.audio_filters.push(filter);
        }
        self
    }

    #[must_use]
    pub fn filter_complex(mut self, graph: String) -> Self {
        self.filter_complex = Some(graph);
        self
    }

    #[must_use]
    pub fn map(mut self, selector: impl Into<String>) -> Self {
        self.maps.push(selector.into());
        self
    }

    #[must_use]
    pub fn video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = codec.into();
        self
    }

    #[must_use]
    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    #[must_use]
    pub fn crf(mut self, crf: u8) -> Self {
        self.crf = Some(crf);
        self
    }

    #[must_use]
    pub fn audio(mut self, audio: AudioOutput) -> Self {
        self.audio = audio;
        self
    }

    /// Appends raw argument strings verbatim; each string is
    /// whitespace-split into individual vector entries.
    #[must_use]
    pub fn extra(mut self, raw: &str) -> Self {
        self.extra_args
            .extend(raw.split_whitespace().map(str::to_string));
        self
    }

    #[must_use]
    pub fn output(mut self, path: impl Into<String>) -> Self {
        self.output = path.into();
        self
    }

    /// Assembles the final argument vector.
    #[must_use]
    pub fn build(self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        if let Some(start) = self.seek_start {
            args.push("-ss".to_string());
            args.push(start);
        }
        if let Some(end) = self.seek_end {
            args.push("-to".to_string());
            args.push(end);
        }

        for input in self.inputs {
            args.push("-i".to_string());
            args.push(input);
        }

        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        } else if !self.video_filters.is_empty() {
            args.push("-vf".to_string());
            args.push(self.video_filters.join(","));
        }

        if !self.audio_filters.is_empty() {
            args.push("-af".to_string());
            args.push(self.audio_filters.join(","));
        }

        if self.maps.is_empty() {
            // Default optional-stream mapping only applies to the simple
            // path; a complex graph declares its own selectors.
            if self.filter_complex.is_none() {
                for selector in ["0:v?", "0:a?"] {
                    args.push("-map".to_string());
                    args.push(selector.to_string());
                }
            }
        } else {
            for selector in self.maps {
                args.push("-map".to_string());
                args.push(selector);
            }
        }

        args.push("-c:v".to_string());
        args.push(self.video_codec.clone());
        if self.video_codec != "copy" {
            if let Some(preset) = self.preset {
                args.push("-preset".to_string());
                args.push(preset);
            }
            if let Some(crf) = self.crf {
                args.push("-crf".to_string());
                args.push(crf.to_string());
            }
        }

        match self.audio {
            AudioOutput::Disabled => args.push("-an".to_string()),
            AudioOutput::Encode { codec, bitrate_k } => {
                args.push("-c:a".to_string());
                let copy = codec == "copy";
                args.push(codec);
                if !copy {
                    if let Some(bitrate) = bitrate_k {
                        args.push("-b:a".to_string());
                        args.push(format!("{bitrate}k"));
                    }
                }
            }
        }

        args.extend(self.extra_args);
        args.push(self.output);
        args
    }
}
