use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::core::GenerationService;
use crate::error::{AIError, MockError};

/// Scripted outcome of one mock call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Success(String),
    RateLimited,
    Error(String),
}

impl MockResponse {
    /// A well-formed 15-question quiz about the water cycle.
    pub fn sample_quiz() -> Self {
        Self::Success(sample_quiz_text())
    }
}

/// Shared view of a [`MockClient`]'s script and call history.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockHandle {
    pub fn add_response(&self, response: MockResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        for response in responses {
            self.add_response(response);
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Scripted responses not consumed yet
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        self.responses.lock().ok().and_then(|mut r| r.pop_front())
    }
}

/// Mock client for testing that replays scripted responses in order
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: Arc::clone(&handle) }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.add_responses(responses);
        (client, handle)
    }
}

#[async_trait]
impl GenerationService for MockClient {
    async fn generate_content(&self, prompt: String) -> Result<String, AIError> {
        let response = self.handle.next(prompt);
        debug!(?response, "Mock generation call");
        match response {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::RateLimited) => Err(MockError::RateLimit.into()),
            Some(MockResponse::Error(message)) => Err(MockError::Api(message).into()),
            None => Err(MockError::Exhausted.into()),
        }
    }

    fn clone_box(&self) -> Box<dyn GenerationService> {
        Box::new(self.clone())
    }
}

const SAMPLE_QUESTIONS: [(&str, [&str; 4], char); 15] = [
    ("What drives the water cycle?", ["The Moon", "The Sun", "Wind", "Earth's core"], 'B'),
    ("What is evaporation?", ["Water turning to vapour", "Vapour turning to water", "Ice melting", "Water freezing"], 'A'),
    ("What forms when water vapour cools in the air?", ["Groundwater", "Rivers", "Clouds", "Glaciers"], 'C'),
    ("What is it called when water falls from clouds?", ["Infiltration", "Transpiration", "Runoff", "Precipitation"], 'D'),
    ("What is transpiration?", ["Water released by plants", "Water soaking into soil", "Snow melting", "Rain hitting the sea"], 'A'),
    ("Where is most of Earth's water stored?", ["Lakes", "Oceans", "Clouds", "Rivers"], 'B'),
    ("What is water that soaks into the ground called?", ["Runoff", "Condensation", "Infiltration", "Sublimation"], 'C'),
    ("What is sublimation?", ["Liquid to gas", "Gas to liquid", "Liquid to solid", "Solid directly to gas"], 'D'),
    ("Which form of precipitation is frozen?", ["Snow", "Drizzle", "Dew", "Fog"], 'A'),
    ("What is surface runoff?", ["Water in clouds", "Water flowing over land", "Water inside plants", "Frozen water"], 'B'),
    ("What process makes dew form on grass?", ["Evaporation", "Infiltration", "Condensation", "Transpiration"], 'C'),
    ("Where is most of Earth's fresh water stored?", ["Oceans", "Rivers", "Clouds", "Ice caps and glaciers"], 'D'),
    ("What is an aquifer?", ["Underground layer holding water", "A type of cloud", "A river mouth", "A rain gauge"], 'A'),
    ("Which factor speeds up evaporation?", ["Lower temperature", "Higher temperature", "More clouds", "Less sunlight"], 'B'),
    ("What returns river water to the ocean?", ["Sublimation", "Transpiration", "Runoff and streamflow", "Condensation"], 'C'),
];

/// Generated-style quiz text in the format the parser expects.
pub fn sample_quiz_text() -> String {
    SAMPLE_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, (question, options, answer))| {
            format!(
                "Q{}. {}\nA) {}\nB) {}\nC) {}\nD) {}\nCorrect Answer: {}\n\n",
                i + 1,
                question,
                options[0],
                options[1],
                options[2],
                options[3],
                answer
            )
        })
        .collect()
}
