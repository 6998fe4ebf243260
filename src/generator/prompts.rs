//! Prompt builders and response-text parsers for the strategy generator.
//!
//! Each builder returns the full prompt for one operation. JSON-shaped
//! responses are decoded in `generator::llm`; the free-text trends
//! response is parsed here.

use regex::Regex;

use crate::model::{OnboardingData, PostDraft, PostIdea, Strategy, Trend, TrendSource};

/// Prompt for deducing onboarding defaults from an "About" section.
pub fn suggest_onboarding_prompt(profile_text: &str) -> String {
    format!(
        r#"You are a world-class LinkedIn strategist and branding expert. Analyze the following LinkedIn "About" section. Based on the text, your task is to deduce the user's professional identity and generate a preliminary strategy profile for them.

User's "About" Section:
---
{profile_text}
---

Based *only* on the text provided, respond with a JSON object with these fields:
- "industry": the user's primary industry or field, deduced from their profile
- "goal": a likely primary goal on LinkedIn, such as 'Build a personal brand' or 'Generate leads'
- "topics": a comma-separated list of 3-5 key topics of expertise mentioned or implied in the text
- "tone": the most fitting tone of voice, chosen from: 'Professional', 'Casual & Humorous', 'Inspirational & Motivational', 'Technical & Educational'
- "targetAudience": a specific, deduced target audience, e.g. 'Hiring managers in tech'

Deduce the most likely values for each field. Be specific and insightful."#
    )
}

/// Prompt for generating the full strategy from onboarding input.
pub fn build_strategy_prompt(input: &OnboardingData) -> String {
    format!(
        r#"You are a world-class LinkedIn strategist and personal branding expert. A user has provided the following information about themselves. Your task is to generate a concise, actionable LinkedIn strategy and initial content ideas for them.

User Information:
- Industry: {industry}
- Target Audience: {audience}
- Primary Goal on LinkedIn: {goal}
- Topics of Expertise/Passion: {topics}
- Desired Tone of Voice: {tone}

Respond with a JSON object with these fields:
- "summary": a short, encouraging paragraph summarizing the strategy
- "contentPillars": an array of 3-5 key themes to focus content on
- "tone": the recommended tone of voice
- "targetAudience": the user's target audience, copied verbatim into this field
- "postIdeas": an array of exactly 5 distinct, engaging post ideas, each an object with "title" and a one-sentence "description""#,
        industry = input.industry,
        audience = input.target_audience,
        goal = input.goal,
        topics = input.topics,
        tone = input.tone,
    )
}

/// Prompt for replacing a strategy's post ideas with 5 new ones.
pub fn regenerate_ideas_prompt(strategy: &Strategy) -> String {
    let existing_titles = strategy
        .post_ideas
        .iter()
        .map(|idea| idea.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"You are a world-class LinkedIn strategist. Based on the user's strategy below, generate 5 completely new and distinct content ideas.

User's Strategy:
- Target Audience: {audience}
- Content Pillars: {pillars}
- Tone of Voice: {tone}

IMPORTANT: Do NOT repeat or rephrase any of the following existing ideas: "{existing_titles}". The new ideas must be different.

Respond with a JSON object: {{"postIdeas": [{{"title": ..., "description": ...}}, ...]}} containing exactly 5 new post ideas."#,
        audience = strategy.target_audience,
        pillars = strategy.content_pillars.join(", "),
        tone = strategy.tone,
    )
}

/// Prompt for writing a complete post from an idea.
pub fn generate_post_prompt(idea: &PostIdea, strategy: &Strategy) -> String {
    format!(
        r#"You are an expert LinkedIn copywriter. Your task is to write a complete, engaging LinkedIn post. The post should be ready to be copied and pasted.

The user's overall strategy is:
- Target Audience: {audience}
- Tone of Voice: {tone}

The specific post you need to write is about:
- Title: "{title}"
- More context: "{description}"

Please write the post now. Use paragraphs, bullet points if appropriate, and 3-5 relevant hashtags at the end to make it readable and effective. Do not include any preamble like "Here is the post:". Just provide the post content itself."#,
        audience = strategy.target_audience,
        tone = strategy.tone,
        title = idea.title,
        description = idea.description,
    )
}

/// Prompt for expanding a user draft into a complete post.
pub fn generate_post_from_draft_prompt(draft: &PostDraft, strategy: &Strategy) -> String {
    format!(
        r#"You are an expert LinkedIn copywriter. Your task is to take a user's draft and expand it into a complete, engaging LinkedIn post. The post should be ready to be copied and pasted.

The user's overall strategy is:
- Target Audience: {audience}
- Tone of Voice: {tone}

The user's draft is:
- Title: "{title}"
- Key Points / Draft Content: "{key_points}"

Please write the full post now based on the draft. Flesh it out, ensure it flows well, and add relevant details. Use paragraphs, bullet points if appropriate, and 3-5 relevant hashtags at the end. Do not include any preamble like "Here is the post:". Just provide the post content itself."#,
        audience = strategy.target_audience,
        tone = strategy.tone,
        title = draft.title,
        key_points = draft.key_points,
    )
}

/// Prompt for suggesting optimal posting times.
pub fn posting_times_prompt(strategy: &Strategy) -> String {
    format!(
        r#"Based on general best practices for LinkedIn and the user's specific strategy, suggest 3-4 optimal days and times for them to post.

User's Strategy:
- Summary: {summary}
- Target Audience: {audience}

Consider when this audience is most likely to be active on LinkedIn. Respond with a JSON object: {{"suggestions": [{{"day": "Monday".."Sunday", "time": "a time window, e.g. '9:00 AM - 11:00 AM EST'"}}, ...]}}."#,
        summary = strategy.summary,
        audience = strategy.target_audience,
    )
}

/// Prompt for recommending the single best idea to schedule next.
pub fn next_post_prompt(strategy: &Strategy) -> String {
    let post_titles = strategy
        .post_ideas
        .iter()
        .map(|idea| format!("- \"{}\"", idea.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are a strategic content planner for LinkedIn. A user has a content strategy and a list of post ideas. Your task is to recommend the single best post for them to schedule next.

User's Strategy:
- Goal: Drive engagement and build authority.
- Target Audience: {audience}
- Content Pillars: {pillars}

Available Post Ideas:
{post_titles}

Analyze the ideas and choose the one that would be most impactful to post now. Provide a compelling but brief reason for your choice. Respond with a JSON object: {{"postTitle": ..., "reason": ...}}. The 'postTitle' must be an exact match from the list of available ideas."#,
        audience = strategy.target_audience,
        pillars = strategy.content_pillars.join(", "),
    )
}

/// Prompt for the trend lookup. The response is free text parsed by
/// [`parse_trends_from_text`].
pub fn fetch_trends_prompt(strategy: &Strategy) -> String {
    format!(
        r#"You are a LinkedIn content expert. Analyze the user's strategy:
Strategy Summary: '{summary}'
Target Audience: '{audience}'
Key Topics: '{pillars}'.

Based on this, identify 3 key trending topics, articles, or discussions on LinkedIn right now that would be highly relevant for them to post about.

For each of the 3 trends, provide a concise title and a one-sentence summary. Format your response clearly, with each trend having a "Title:" and a "Summary:" on separate lines, with a blank line between trends. After the trends, list any source URLs, one per line."#,
        summary = strategy.summary,
        audience = strategy.target_audience,
        pillars = strategy.content_pillars.join(", "),
    )
}

/// Prompt for suggesting comment replies.
pub fn comment_replies_prompt(post_content: &str, comment: &str, strategy: &Strategy) -> String {
    format!(
        r#"You are a LinkedIn engagement expert. Your goal is to help a user reply to a comment on their post in a way that fosters conversation.

User's Strategy:
- Tone of Voice: {tone}
- Target Audience: {audience}

The Original Post:
---
{post_content}
---

The Comment Received:
---
{comment}
---

Please generate 3 distinct, smart, and engaging reply suggestions. The replies should match the user's tone. Each suggestion should have a different angle (e.g., one that adds more value, one that shows appreciation, one that asks a follow-up question).

Respond with a JSON object: {{"suggestions": [{{"style": ..., "reply": ...}}, ...]}}."#,
        tone = strategy.tone,
        audience = strategy.target_audience,
    )
}

/// Prompt for drafting an intro DM to a new connection.
pub fn intro_message_prompt(connection_profile: &str, strategy: &Strategy) -> String {
    format!(
        r#"You are a networking expert specializing in crafting personalized, non-salesy LinkedIn direct messages. Your task is to draft a friendly, genuine opening message to a new connection.

Here is your user's profile context (who you are):
- User's Strategy Summary: {summary}
- User's Key Topics: {pillars}

Here is the new connection's "About" section:
---
{connection_profile}
---

Draft a short, personalized DM. The message should:
1. Reference something specific and interesting from their profile to show you've actually read it.
2. Briefly and humbly connect it to one of your own interests or experiences.
3. End with an open-ended question to encourage a reply and start a real conversation.
4. Be friendly and avoid any sales pitches or requests.

Just provide the DM text itself, with no preamble."#,
        summary = strategy.summary,
        pillars = strategy.content_pillars.join(", "),
    )
}

/// Parse "Title:"/"Summary:" blocks out of a free-text trends response.
pub fn parse_trends_from_text(text: &str) -> Vec<Trend> {
    let block_re = Regex::new(r"(?s)Title:\s*(.+?)\n\s*Summary:\s*(.+)").expect("static regex");
    text.split("\n\n")
        .filter_map(|block| {
            block_re.captures(block.trim()).map(|caps| Trend {
                title: caps[1].trim().to_string(),
                summary: caps[2].trim().to_string(),
            })
        })
        .collect()
}

/// Pull source URLs out of a free-text response, deduplicated by URI.
pub fn extract_sources_from_text(text: &str) -> Vec<TrendSource> {
    let url_re = Regex::new(r"https?://[^\s)\]>\x22']+").expect("static regex");
    let mut sources: Vec<TrendSource> = Vec::new();
    for m in url_re.find_iter(text) {
        let uri = m.as_str().trim_end_matches(['.', ',']).to_string();
        if !sources.iter().any(|s| s.uri == uri) {
            sources.push(TrendSource {
                title: uri.clone(),
                uri,
            });
        }
    }
    sources
}
