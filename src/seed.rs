//! Initial knowledge corpus.
//!
//! Seeded into a fresh knowledge base when no usable snapshot exists:
//! five career tips and four resume-example bullets for each of the six
//! supported roles, all tagged `source = "initial_knowledge"`.

use crate::models::{ContentType, Metadata};

const SEED_SOURCE: &str = "initial_knowledge";

const CAREER_TIPS: &[(&str, &[&str])] = &[
    (
        "frontend_developer",
        &[
            "Emphasize user-facing projects and UI/UX improvements in your resume",
            "Mention specific frameworks and libraries you've used (React, Vue, Angular)",
            "Highlight responsive design and cross-browser compatibility experience",
            "Include links to your portfolio or GitHub projects",
            "Quantify performance improvements (load time reductions, user engagement)",
        ],
    ),
    (
        "backend_developer",
        &[
            "Focus on system architecture and scalability achievements",
            "Highlight API design and database optimization experience",
            "Mention specific technologies and frameworks (Django, Flask, Express)",
            "Quantify system performance improvements and uptime statistics",
            "Include experience with cloud platforms and deployment processes",
        ],
    ),
    (
        "data_scientist",
        &[
            "Quantify impact with specific metrics and percentages",
            "Mention data size and complexity you've handled (millions of records, etc.)",
            "Highlight business insights and recommendations that drove decisions",
            "Include specific ML algorithms and tools used (scikit-learn, TensorFlow)",
            "Show progression from data analysis to actionable business outcomes",
        ],
    ),
    (
        "product_manager",
        &[
            "Focus on product outcomes and user impact metrics",
            "Highlight cross-functional collaboration and stakeholder management",
            "Mention specific methodologies used (Agile, Scrum, Design Thinking)",
            "Quantify product success (user growth, revenue impact, feature adoption)",
            "Show strategic thinking and market analysis capabilities",
        ],
    ),
    (
        "marketing_specialist",
        &[
            "Quantify campaign results with specific ROI and conversion metrics",
            "Highlight multi-channel campaign experience and audience targeting",
            "Mention specific tools and platforms used (Google Analytics, HubSpot)",
            "Show creative problem-solving and A/B testing experience",
            "Include brand building and content strategy achievements",
        ],
    ),
    (
        "ux_designer",
        &[
            "Focus on user-centered design process and research methodologies",
            "Highlight usability improvements and user satisfaction metrics",
            "Mention design tools and prototyping experience (Figma, Sketch)",
            "Show collaboration with development teams and design system work",
            "Include accessibility considerations and inclusive design practices",
        ],
    ),
];

const RESUME_EXAMPLES: &[(&str, &[&str])] = &[
    (
        "frontend_developer",
        &[
            "Developed responsive web applications using React and JavaScript, improving user engagement by 25%",
            "Collaborated with UX designers to implement pixel-perfect designs across multiple browsers",
            "Optimized application performance through code splitting and lazy loading, reducing load times by 40%",
            "Built reusable component library used across 5+ projects, reducing development time by 30%",
        ],
    ),
    (
        "backend_developer",
        &[
            "Designed and implemented RESTful APIs serving 10,000+ daily active users",
            "Optimized database queries and indexing, improving response times by 60%",
            "Built scalable microservices architecture using Docker and Kubernetes",
            "Implemented automated testing and CI/CD pipelines, reducing deployment time by 50%",
        ],
    ),
    (
        "data_scientist",
        &[
            "Developed machine learning models that improved customer retention by 15%",
            "Analyzed large datasets (10M+ records) to identify key business trends and opportunities",
            "Created automated reporting dashboards that saved 20 hours of manual work per week",
            "Collaborated with product teams to implement A/B testing framework for feature optimization",
        ],
    ),
    (
        "product_manager",
        &[
            "Led cross-functional team of 8 engineers and designers to deliver 3 major product features",
            "Increased user engagement by 35% through data-driven product improvements",
            "Conducted user research and market analysis to inform product roadmap decisions",
            "Managed product backlog and sprint planning, improving team velocity by 25%",
        ],
    ),
    (
        "marketing_specialist",
        &[
            "Executed multi-channel marketing campaigns that generated $500K in revenue",
            "Increased social media engagement by 150% through targeted content strategy",
            "Optimized email marketing campaigns, improving open rates by 40% and CTR by 25%",
            "Managed Google Ads campaigns with $50K monthly budget, achieving 3:1 ROAS",
        ],
    ),
    (
        "ux_designer",
        &[
            "Redesigned user onboarding flow, reducing drop-off rate by 30%",
            "Conducted user research with 100+ participants to inform design decisions",
            "Created design system and component library used across 10+ product teams",
            "Improved accessibility compliance from 60% to 95% through inclusive design practices",
        ],
    ),
];

/// The full seed corpus: career tips first, then resume examples,
/// grouped by role in declaration order.
pub fn seed_documents() -> Vec<(String, Metadata)> {
    let mut docs = Vec::new();

    for (role, tips) in CAREER_TIPS {
        for tip in *tips {
            docs.push((
                tip.to_string(),
                Metadata::new(role, ContentType::CareerTip, SEED_SOURCE),
            ));
        }
    }

    for (role, examples) in RESUME_EXAMPLES {
        for example in *examples {
            docs.push((
                example.to_string(),
                Metadata::new(role, ContentType::ResumeExample, SEED_SOURCE),
            ));
        }
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_corpus_shape() {
        let docs = seed_documents();
        // 6 roles × 5 tips + 6 roles × 4 examples.
        assert_eq!(docs.len(), 54);

        let tips = docs
            .iter()
            .filter(|(_, m)| m.content_type == ContentType::CareerTip)
            .count();
        assert_eq!(tips, 30);
        assert_eq!(docs.len() - tips, 24);
    }

    #[test]
    fn test_seed_roles_are_normalized() {
        for (_, meta) in seed_documents() {
            assert_eq!(meta.job_role, crate::models::normalize_role(&meta.job_role));
            assert_eq!(meta.source, SEED_SOURCE);
        }
    }

    #[test]
    fn test_seed_has_all_six_roles() {
        let docs = seed_documents();
        for role in [
            "frontend_developer",
            "backend_developer",
            "data_scientist",
            "product_manager",
            "marketing_specialist",
            "ux_designer",
        ] {
            assert!(docs.iter().any(|(_, m)| m.job_role == role), "missing {role}");
        }
    }
}
