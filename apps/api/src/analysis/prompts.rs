// All LLM prompt constants for the analysis module.
// Templates use `{placeholder}` markers that are filled before sending.

/// System role for match evaluation.
pub const MATCH_SYSTEM: &str = "You are an expert in HR and technical screening. \
    Only respond with JSON, do not include explanations or notes.";

/// Match evaluation prompt. Replace `{resume_text}`, `{job_description}`, `{json_only}`.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert ATS evaluator.
Evaluate how well this resume matches the following job description.
Give a match percentage, a short reasoning, and list key missing or strong skills.

Resume:
{resume_text}

Job Description:
{job_description}

Respond in structured JSON:
{
  "match_score": "85%",
  "summary": "Excellent match for full-stack roles.",
  "strengths": ["React", "Spring Boot"],
  "weaknesses": ["Docker", "AWS"]
}

{json_only}"#;

/// System role for two-resume comparison.
pub const COMPARE_SYSTEM: &str = "You are an expert in HR, ATS evaluation, and technical screening. \
    Only respond with JSON.";

/// Comparison prompt. Replace `{resume_a}`, `{resume_b}`, `{job_description}`, `{json_only}`.
pub const COMPARE_PROMPT_TEMPLATE: &str = r#"You are an expert ATS evaluator and career coach.
Compare two resumes and evaluate:

1. Overall match to the job description (if provided)
2. Strong skills for each resume
3. Weak skills / missing skills for each resume
4. Skills overlap and differences
5. Suggested improvements
6. Recommend which resume has higher chance of getting the job based on match score and skills

Respond in structured JSON:
{
  "resume1": {
    "match_score": "85%",
    "strengths": ["React", "Spring Boot"],
    "weaknesses": ["Docker", "AWS"]
  },
  "resume2": {
    "match_score": "78%",
    "strengths": ["React", "AWS"],
    "weaknesses": ["Spring Boot", "Docker"]
  },
  "common_skills": ["React"],
  "differences": {
    "resume1_only": ["Spring Boot"],
    "resume2_only": ["AWS"]
  },
  "recommendation": "Resume 1 has a higher chance of getting the job."
}

Resume 1:
{resume_a}

Resume 2:
{resume_b}

Job Description:
{job_description}

{json_only}"#;

/// Marker substituted when no job description accompanies a comparison.
pub const NO_JOB_DESCRIPTION: &str = "None";

/// System role for chunk-by-chunk optimization.
pub const OPTIMIZE_SYSTEM: &str = "Produce valid XHTML for PDF, no comments, no notes.";

/// Per-chunk rewrite prompt. Replace `{chunk}`.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"You are a professional resume designer.
Rewrite this text into XHTML (only the chunk content, valid HTML tags, no notes):
{chunk}"#;

/// System role for the weakness-driven rewrite.
pub const EXPAND_SYSTEM: &str = "You are a professional resume designer who maximizes ATS and job match. \
    Do not include any notes or explanations.";

/// Weakness-driven rewrite prompt. Replace `{missing_skills}`, `{resume_text}`, `{markup_only}`.
pub const EXPAND_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer.
Rewrite the following resume into a PDF-ready XHTML document and add experience, projects, or skills to cover these missing areas:
{missing_skills}

Requirements:
- Keep the output as valid XHTML suitable for PDF generation.
- Use <h1> for name, <h2> for sections, <ul><li> for lists, <p> for paragraphs.
- Include inline CSS only if necessary.
- {markup_only}

Resume text:
{resume_text}"#;

/// System role for entity extraction.
pub const STRUCTURED_SYSTEM: &str = "You are a professional resume parser that always returns valid JSON. \
    Do not add any extra notes or explanations.";

/// Entity extraction prompt. Replace `{chunk}`.
pub const STRUCTURED_PROMPT_TEMPLATE: &str = r#"Extract the following details from this resume and return as valid JSON:
{
  "name": "",
  "email": "",
  "phone": "",
  "skills": [],
  "education": [],
  "work_experience": [],
  "projects": []
}
Resume text:
{chunk}"#;
