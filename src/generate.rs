//! Structured resume-plan generation.
//!
//! Calls a Gemini-compatible `generateContent` endpoint with a JSON
//! response schema and validates the result. Requires the
//! `GEMINI_API_KEY` environment variable. When the API is unreachable or
//! returns something unusable, callers fall back to
//! [`fallback_plan`], which assembles bullets from retrieved resume
//! examples instead.
//!
//! Retry strategy mirrors the embedding client: 429 and 5xx retry with
//! exponential backoff, other 4xx fail immediately.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::advisor::JobRequirements;
use crate::config::GenerationConfig;

/// Tone preference for generated bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Professional,
    Creative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Creative => "creative",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Tone::Professional),
            "creative" => Ok(Tone::Creative),
            other => Err(format!(
                "unknown tone '{}' (expected professional or creative)",
                other
            )),
        }
    }
}

/// Candidate profile collected by the CLI.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub name: String,
    pub skills: Vec<String>,
    pub target_role: String,
    pub tone: Tone,
}

/// The structured output: tailored bullets plus skill gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePlan {
    #[serde(rename = "resumeBullets")]
    pub resume_bullets: Vec<String>,
    #[serde(rename = "skillGaps")]
    pub skill_gaps: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You are an expert career mentor and resume writer specializing in \
helping job seekers optimize their resumes for specific roles.\n\n\
Your expertise includes:\n\
- Creating compelling, action-oriented resume bullet points that highlight achievements\n\
- Identifying skill gaps between current abilities and job requirements\n\
- Tailoring advice to different industries and experience levels\n\
- Providing practical, actionable career guidance\n\n\
Your responses should be professional, encouraging, specific, and actionable. \
Always respond in the exact JSON format requested.";

/// Format the candidate, requirements, and retrieved guidance into the
/// user prompt.
pub fn build_user_prompt(
    profile: &UserProfile,
    requirements: &JobRequirements,
    career_tips: &[String],
) -> String {
    let tips_block = career_tips
        .iter()
        .map(|tip| format!("- {tip}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a personalized resume optimization for the following candidate:\n\n\
CANDIDATE INFORMATION:\n\
- Name: {}\n\
- Current Skills: {}\n\
- Target Role: {}\n\
- Tone Preference: {}\n\n\
JOB REQUIREMENTS:\n\
- Required Skills: {}\n\
- Nice to Have: {}\n\n\
INDUSTRY GUIDANCE:\n\
{}\n\n\
TASK:\n\
Generate 3-5 tailored resume bullet points that showcase the candidate's experience \
in a way that aligns with the target role. Also identify 2-3 specific skill gaps they \
should focus on developing.\n\n\
Respond ONLY with JSON of the shape {{\"resumeBullets\": [...], \"skillGaps\": [...]}}.",
        profile.name,
        profile.skills.join(", "),
        profile.target_role,
        profile.tone.as_str(),
        requirements.required_skills.join(", "),
        requirements.nice_to_have.join(", "),
        tips_block,
    )
}

/// Generate a resume plan via the Gemini API.
pub async fn generate_plan(
    config: &GenerationConfig,
    profile: &UserProfile,
    requirements: &JobRequirements,
    career_tips: &[String],
) -> Result<ResumePlan> {
    let api_key =
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY environment variable not set")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let user_prompt = build_user_prompt(profile, requirements, career_tips);
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
        config.model
    );

    let body = serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_PROMPT }]
        },
        "contents": [{
            "parts": [{ "text": user_prompt }]
        }],
        "generationConfig": {
            "temperature": 0.7,
            "topK": 40,
            "topP": 0.8,
            "maxOutputTokens": 500,
            "responseMimeType": "application/json"
        }
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    match parse_generation_response(&json) {
                        Ok(plan) => return Ok(plan),
                        Err(e) => {
                            // Malformed JSON from the model is retryable.
                            warn!(error = %e, "generation response unusable");
                            last_err = Some(e);
                            continue;
                        }
                    }
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!("Gemini API error {status}: {body_text}"));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                bail!("Gemini API error {status}: {body_text}");
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("generation failed after retries")))
}

/// Pull the model's JSON payload out of the `generateContent` envelope
/// and validate its shape.
fn parse_generation_response(json: &serde_json::Value) -> Result<ResumePlan> {
    let text = json
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|t| t.as_str())
        .context("generation response missing candidate text")?;

    let plan: ResumePlan =
        serde_json::from_str(text.trim()).context("candidate text is not the expected JSON")?;

    if plan.resume_bullets.is_empty() {
        bail!("generation returned no resume bullets");
    }

    debug!(
        bullets = plan.resume_bullets.len(),
        gaps = plan.skill_gaps.len(),
        "generation response parsed"
    );
    Ok(plan)
}

/// Assemble a plan from retrieved resume examples when generation is
/// unavailable: personalize up to three examples with the candidate's
/// skills and close with a skills summary bullet.
pub fn fallback_plan(
    profile: &UserProfile,
    resume_examples: &[String],
    skill_gaps: Vec<String>,
) -> ResumePlan {
    let mut bullets = Vec::new();

    for example in resume_examples.iter().take(3) {
        let mentions_skill = profile
            .skills
            .iter()
            .any(|skill| example.to_lowercase().contains(&skill.to_lowercase()));

        let bullet = if mentions_skill || profile.skills.is_empty() {
            example.clone()
        } else {
            example.replacen("using", &format!("using {} and", profile.skills[0]), 1)
        };
        bullets.push(bullet);
    }

    if !profile.skills.is_empty() {
        let skills_str = profile
            .skills
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        bullets.push(format!(
            "Leveraged {skills_str} to deliver high-quality solutions and exceed project expectations"
        ));
    }

    bullets.truncate(4);

    ResumePlan {
        resume_bullets: bullets,
        skill_gaps,
    }
}
