/// Fabricated transcript for a finished simulation. No speech recognition takes place.
pub fn placeholder_transcript(file_name: &str) -> String {
    format!(
        "Hello. This is a sample transcription result for {file_name}.

Real speech recognition requires an external service such as the OpenAI Whisper API, \
Google Cloud Speech-to-Text or Azure Speech Services.

This is demonstration data. Processing time is simulated from the size of the audio \
file to reproduce the flow of a real job.

While a job is running the following features are active:
- elapsed time display
- estimated completion time
- start disabled until the job ends
- warning before exiting
- stop button to cancel the job

Connected to a real API, this application would work as a full transcription service."
    )
}

#[cfg(test)]
mod tests {
    use super::placeholder_transcript;

    #[test]
    fn mentions_the_file_name() {
        let text = placeholder_transcript("meeting.wav");
        assert!(text.starts_with("Hello. This is a sample transcription result for meeting.wav."));
    }
}
