//! Retrieval orchestration and static fallback layer.
//!
//! Sits between callers and the [`RetrievalEngine`](crate::engine): asks
//! the engine first, and falls back to the built-in dictionaries whenever
//! the engine is degraded or returns nothing. The unavailable path is an
//! explicit branch on the engine's status and result shape, not an error
//! handler.
//!
//! Also hosts the static job-requirements lookup and the skill-gap
//! analysis used by the `advise` command.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::engine::RetrievalEngine;
use crate::models::{normalize_role, ContentType};

/// How a knowledge lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    VectorDatabase,
    FallbackDictionary,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::VectorDatabase => "vector_database",
            SearchMethod::FallbackDictionary => "fallback_dictionary",
        }
    }
}

/// Retrieve career tips for a role: semantic search first, dictionary
/// fallback when the engine has nothing to offer.
pub async fn career_tips(
    engine: &RetrievalEngine,
    retrieval: &RetrievalConfig,
    job_role: &str,
) -> Vec<String> {
    let query = format!(
        "career tips advice guidance for {job_role} professional development resume"
    );
    let hits = engine
        .search(
            &query,
            Some(job_role),
            Some(ContentType::CareerTip),
            retrieval.tip_results,
        )
        .await;

    if !hits.is_empty() {
        info!(count = hits.len(), job_role, "retrieved career tips from knowledge base");
        for (i, hit) in hits.iter().enumerate() {
            debug!(rank = i + 1, score = hit.score, "tip similarity");
        }
        return hits.into_iter().map(|h| h.document).collect();
    }

    info!(job_role, "using fallback dictionary for career tips");
    fallback_tips(job_role)
}

/// Retrieve resume-example bullets for a role, with dictionary fallback.
pub async fn resume_examples(
    engine: &RetrievalEngine,
    retrieval: &RetrievalConfig,
    job_role: &str,
) -> Vec<String> {
    let query = format!(
        "resume bullet points examples achievements for {job_role} professional experience"
    );
    let hits = engine
        .search(
            &query,
            Some(job_role),
            Some(ContentType::ResumeExample),
            retrieval.example_results,
        )
        .await;

    if !hits.is_empty() {
        info!(count = hits.len(), job_role, "retrieved resume examples from knowledge base");
        return hits.into_iter().map(|h| h.document).collect();
    }

    info!(job_role, "using fallback dictionary for resume examples");
    fallback_examples(job_role)
}

/// Free-text knowledge search split into tips and examples.
#[derive(Debug, Serialize)]
pub struct KnowledgeSearch {
    pub query: String,
    pub job_role: Option<String>,
    pub search_method: SearchMethod,
    pub career_tips: Vec<String>,
    pub resume_examples: Vec<String>,
    pub tip_scores: Vec<f32>,
    pub example_scores: Vec<f32>,
}

/// Search the knowledge base across both content types, splitting the
/// ranked hits into tips and examples (top five of each). Degraded or
/// empty engines fall back to the role dictionaries.
pub async fn search_knowledge(
    engine: &RetrievalEngine,
    retrieval: &RetrievalConfig,
    query: &str,
    job_role: Option<&str>,
) -> KnowledgeSearch {
    let hits = engine
        .search(query, job_role, None, retrieval.search_results)
        .await;

    if !hits.is_empty() {
        let mut tips = Vec::new();
        let mut tip_scores = Vec::new();
        let mut examples = Vec::new();
        let mut example_scores = Vec::new();

        for hit in hits {
            match hit.metadata.content_type {
                ContentType::CareerTip if tips.len() < 5 => {
                    tips.push(hit.document);
                    tip_scores.push(hit.score);
                }
                ContentType::ResumeExample if examples.len() < 5 => {
                    examples.push(hit.document);
                    example_scores.push(hit.score);
                }
                _ => {}
            }
        }

        info!(
            tips = tips.len(),
            examples = examples.len(),
            query,
            "knowledge search served from vector database"
        );

        return KnowledgeSearch {
            query: query.to_string(),
            job_role: job_role.map(|r| r.to_string()),
            search_method: SearchMethod::VectorDatabase,
            career_tips: tips,
            resume_examples: examples,
            tip_scores,
            example_scores,
        };
    }

    info!(query, "knowledge search falling back to dictionaries");
    let (tips, examples) = match job_role {
        Some(role) => (fallback_tips(role), fallback_examples(role)),
        None => (generic_tips(), generic_examples()),
    };

    KnowledgeSearch {
        query: query.to_string(),
        job_role: job_role.map(|r| r.to_string()),
        search_method: SearchMethod::FallbackDictionary,
        career_tips: tips,
        resume_examples: examples,
        tip_scores: Vec::new(),
        example_scores: Vec::new(),
    }
}

// ============ Job requirements ============

/// Structured requirements for a known role.
#[derive(Debug, Clone, Serialize)]
pub struct JobRequirements {
    pub role: String,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
}

const JOB_REQUIREMENTS: &[(&str, &str, &[&str], &[&str])] = &[
    (
        "frontend_developer",
        "Frontend Developer",
        &["JavaScript", "React", "HTML", "CSS", "Git"],
        &["TypeScript", "Node.js", "Testing", "Webpack", "SASS"],
    ),
    (
        "backend_developer",
        "Backend Developer",
        &["Python", "SQL", "REST APIs", "Git", "Linux"],
        &["Docker", "AWS", "Redis", "GraphQL", "Microservices"],
    ),
    (
        "data_scientist",
        "Data Scientist",
        &["Python", "SQL", "Statistics", "Machine Learning", "Pandas"],
        &["R", "Tableau", "AWS", "TensorFlow", "Jupyter"],
    ),
    (
        "product_manager",
        "Product Manager",
        &["Product Strategy", "User Research", "Analytics", "Communication", "Agile"],
        &["SQL", "Figma", "A/B Testing", "Roadmapping", "Stakeholder Management"],
    ),
    (
        "marketing_specialist",
        "Marketing Specialist",
        &["Digital Marketing", "Content Creation", "Analytics", "Social Media", "SEO"],
        &["Google Ads", "Email Marketing", "Photoshop", "CRM", "Marketing Automation"],
    ),
    (
        "ux_designer",
        "UX Designer",
        &["User Research", "Wireframing", "Prototyping", "Figma", "User Testing"],
        &["Adobe Creative Suite", "HTML/CSS", "Animation", "Design Systems", "Accessibility"],
    ),
];

/// Look up the predefined requirements for a role. Unknown roles get the
/// frontend-developer entry, matching the knowledge base's default.
pub fn job_requirements(role: &str) -> JobRequirements {
    let key = normalize_role(role);
    let entry = JOB_REQUIREMENTS
        .iter()
        .find(|(k, ..)| *k == key)
        .unwrap_or(&JOB_REQUIREMENTS[0]);

    JobRequirements {
        role: entry.1.to_string(),
        required_skills: entry.2.iter().map(|s| s.to_string()).collect(),
        nice_to_have: entry.3.iter().map(|s| s.to_string()).collect(),
    }
}

/// All role names with predefined requirements, in display form.
pub fn all_roles() -> Vec<&'static str> {
    JOB_REQUIREMENTS.iter().map(|(_, name, ..)| *name).collect()
}

/// Case-insensitive difference between required skills and the user's,
/// capped at three gaps.
pub fn skill_gaps(user_skills: &[String], required_skills: &[String]) -> Vec<String> {
    let have: Vec<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();

    required_skills
        .iter()
        .filter(|req| !have.contains(&req.to_lowercase()))
        .take(3)
        .cloned()
        .collect()
}

// ============ Fallback dictionaries ============

fn fallback_tips(role: &str) -> Vec<String> {
    let key = normalize_role(role);
    let tips: &[&str] = match key.as_str() {
        "backend_developer" => &[
            "Focus on system architecture and scalability achievements",
            "Highlight API design and database optimization experience",
            "Mention specific technologies and frameworks (Django, Flask, Express)",
            "Quantify system performance improvements and uptime statistics",
            "Include experience with cloud platforms and deployment processes",
        ],
        "data_scientist" => &[
            "Quantify impact with specific metrics and percentages",
            "Mention data size and complexity you've handled (millions of records, etc.)",
            "Highlight business insights and recommendations that drove decisions",
            "Include specific ML algorithms and tools used (scikit-learn, TensorFlow)",
            "Show progression from data analysis to actionable business outcomes",
        ],
        "product_manager" => &[
            "Focus on product outcomes and user impact metrics",
            "Highlight cross-functional collaboration and stakeholder management",
            "Mention specific methodologies used (Agile, Scrum, Design Thinking)",
            "Quantify product success (user growth, revenue impact, feature adoption)",
            "Show strategic thinking and market analysis capabilities",
        ],
        "marketing_specialist" => &[
            "Quantify campaign results with specific ROI and conversion metrics",
            "Highlight multi-channel campaign experience and audience targeting",
            "Mention specific tools and platforms used (Google Analytics, HubSpot)",
            "Show creative problem-solving and A/B testing experience",
            "Include brand building and content strategy achievements",
        ],
        "ux_designer" => &[
            "Focus on user-centered design process and research methodologies",
            "Highlight usability improvements and user satisfaction metrics",
            "Mention design tools and prototyping experience (Figma, Sketch)",
            "Show collaboration with development teams and design system work",
            "Include accessibility considerations and inclusive design practices",
        ],
        _ => &[
            "Emphasize user-facing projects and UI/UX improvements in your resume",
            "Mention specific frameworks and libraries you've used (React, Vue, Angular)",
            "Highlight responsive design and cross-browser compatibility experience",
            "Include links to your portfolio or GitHub projects",
            "Quantify performance improvements (load time reductions, user engagement)",
        ],
    };
    tips.iter().map(|s| s.to_string()).collect()
}

fn fallback_examples(role: &str) -> Vec<String> {
    let key = normalize_role(role);
    let examples: &[&str] = match key.as_str() {
        "backend_developer" => &[
            "Designed and implemented RESTful APIs serving 10,000+ daily active users",
            "Optimized database queries and indexing, improving response times by 60%",
            "Built scalable microservices architecture using Docker and Kubernetes",
            "Implemented automated testing and CI/CD pipelines, reducing deployment time by 50%",
        ],
        "data_scientist" => &[
            "Developed machine learning models that improved customer retention by 15%",
            "Analyzed large datasets (10M+ records) to identify key business trends and opportunities",
            "Created automated reporting dashboards that saved 20 hours of manual work per week",
            "Collaborated with product teams to implement A/B testing framework for feature optimization",
        ],
        "product_manager" => &[
            "Led cross-functional team of 8 engineers and designers to deliver 3 major product features",
            "Increased user engagement by 35% through data-driven product improvements",
            "Conducted user research and market analysis to inform product roadmap decisions",
            "Managed product backlog and sprint planning, improving team velocity by 25%",
        ],
        "marketing_specialist" => &[
            "Executed multi-channel marketing campaigns that generated $500K in revenue",
            "Increased social media engagement by 150% through targeted content strategy",
            "Optimized email marketing campaigns, improving open rates by 40% and CTR by 25%",
            "Managed Google Ads campaigns with $50K monthly budget, achieving 3:1 ROAS",
        ],
        "ux_designer" => &[
            "Redesigned user onboarding flow, reducing drop-off rate by 30%",
            "Conducted user research with 100+ participants to inform design decisions",
            "Created design system and component library used across 10+ product teams",
            "Improved accessibility compliance from 60% to 95% through inclusive design practices",
        ],
        _ => &[
            "Developed responsive web applications using React and JavaScript, improving user engagement by 25%",
            "Collaborated with UX designers to implement pixel-perfect designs across multiple browsers",
            "Optimized application performance through code splitting and lazy loading, reducing load times by 40%",
            "Built reusable component library used across 5+ projects, reducing development time by 30%",
        ],
    };
    examples.iter().map(|s| s.to_string()).collect()
}

fn generic_tips() -> Vec<String> {
    [
        "Use action verbs to start each bullet point (Developed, Implemented, Optimized)",
        "Quantify achievements with specific numbers and percentages",
        "Tailor your resume to match the job description keywords",
        "Focus on results and impact rather than just responsibilities",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn generic_examples() -> Vec<String> {
    [
        "Increased team productivity by 25% through process improvements",
        "Led project that resulted in $100K cost savings annually",
        "Collaborated with cross-functional teams to deliver key initiatives",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
