// src/twiml.rs
//
// Minimal TwiML voice-response builder: only the verbs this call flow emits
// (Say, Gather, Redirect). The telephony provider interprets the rendered
// document to speak prompts and collect the next caller input.

/// Seconds the provider waits for caller input before posting back with
/// neither `SpeechResult` nor `Digits`.
pub const GATHER_TIMEOUT_SECS: u32 = 5;

enum Verb {
    Say(String),
    Gather(Gather),
    Redirect(String),
}

/// A Gather collects speech and keypad digits, then POSTs the result to
/// `action`.
pub struct Gather {
    timeout: u32,
    num_digits: u32,
    action: String,
    prompts: Vec<String>,
}

impl Gather {
    pub fn new(action: &str, num_digits: u32) -> Self {
        Self {
            timeout: GATHER_TIMEOUT_SECS,
            num_digits,
            action: action.to_string(),
            prompts: Vec::new(),
        }
    }

    pub fn say(mut self, text: &str) -> Self {
        self.prompts.push(text.to_string());
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str(&format!(
            "<Gather input=\"speech dtmf\" timeout=\"{}\" numDigits=\"{}\" action=\"{}\" method=\"POST\">",
            self.timeout,
            self.num_digits,
            escape(&self.action)
        ));
        for prompt in &self.prompts {
            out.push_str(&format!("<Say>{}</Say>", escape(prompt)));
        }
        out.push_str("</Gather>");
    }
}

#[derive(Default)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, text: &str) -> &mut Self {
        self.verbs.push(Verb::Say(text.to_string()));
        self
    }

    pub fn gather(&mut self, gather: Gather) -> &mut Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    /// Tells the provider to re-enter the flow at `url` with a fresh POST.
    pub fn redirect(&mut self, url: &str) -> &mut Self {
        self.verbs.push(Verb::Redirect(url.to_string()));
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(text) => out.push_str(&format!("<Say>{}</Say>", escape(text))),
                Verb::Gather(gather) => gather.render(&mut out),
                Verb::Redirect(url) => {
                    out.push_str(&format!("<Redirect>{}</Redirect>", escape(url)))
                }
            }
        }
        out.push_str("</Response>");
        out
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_say_inside_response_envelope() {
        let mut response = VoiceResponse::new();
        response.say("Hello caller.");
        assert_eq!(
            response.render(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Say>Hello caller.</Say></Response>"
        );
    }

    #[test]
    fn renders_gather_with_prompt_and_attributes() {
        let mut response = VoiceResponse::new();
        response.gather(Gather::new("/menu", 1).say("Press 1 or 2."));
        let xml = response.render();
        assert!(xml.contains(
            "<Gather input=\"speech dtmf\" timeout=\"5\" numDigits=\"1\" action=\"/menu\" method=\"POST\">"
        ));
        assert!(xml.contains("<Say>Press 1 or 2.</Say></Gather>"));
    }

    #[test]
    fn renders_say_then_redirect_in_order() {
        let mut response = VoiceResponse::new();
        response.say("Invalid option.").redirect("/ivr");
        let xml = response.render();
        let say = xml.find("<Say>").unwrap();
        let redirect = xml.find("<Redirect>/ivr</Redirect>").unwrap();
        assert!(say < redirect);
    }

    #[test]
    fn escapes_xml_metacharacters_in_spoken_text() {
        let mut response = VoiceResponse::new();
        response.say("AT&T is <great>");
        assert!(response
            .render()
            .contains("<Say>AT&amp;T is &lt;great&gt;</Say>"));
    }
}
