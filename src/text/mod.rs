//! Background prompts and ad captions from a text model.
//!
//! Both generators always hand back exactly the number of items asked for:
//! a failing model, an empty reply or a short list all fall back to
//! deterministic templates built from the product description.

use tracing::{info, warn};

mod gemini;
pub mod parser;

pub use gemini::GeminiClient;

use parser::{fill_to_count, parse_list};

/// Prompts shorter than this are treated as parse noise.
const MIN_PROMPT_CHARS: usize = 10;
/// Captions shorter than this are treated as parse noise.
const MIN_CAPTION_CHARS: usize = 5;

/// A model that completes a single text prompt.
pub trait TextModel {
    /// Returns the model's reply to `prompt`.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = anyhow::Result<String>> + Send;
}

/// Asks the model for `count` background scene prompts for Stable Diffusion.
pub async fn generate_prompts<M: TextModel + Sync>(
    model: &M,
    description: &str,
    count: usize,
) -> Vec<String> {
    let reply = match model.complete(&prompt_instructions(description, count)).await {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => {
            warn!("Text model returned an empty prompt list, using fallback prompts");
            return fill_to_count(Vec::new(), &failure_prompts(description), count, vary_prompt);
        }
        Err(err) => {
            warn!("Error generating prompts: {err:#}");
            return fill_to_count(Vec::new(), &failure_prompts(description), count, vary_prompt);
        }
    };

    let parsed = parse_list(&reply, MIN_PROMPT_CHARS);
    info!("Parsed {} of {} prompts from the model", parsed.len().min(count), count);
    fill_to_count(parsed, &short_prompts(description), count, vary_prompt)
}

/// Asks the model for `count` social media ad captions.
pub async fn generate_captions<M: TextModel + Sync>(
    model: &M,
    description: &str,
    count: usize,
) -> Vec<String> {
    let reply = match model.complete(&caption_instructions(description, count)).await {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => {
            warn!("Text model returned an empty caption list, using fallback captions");
            return fill_to_count(Vec::new(), &failure_captions(description), count, vary_caption);
        }
        Err(err) => {
            warn!("Error generating captions: {err:#}");
            return fill_to_count(Vec::new(), &failure_captions(description), count, vary_caption);
        }
    };

    let parsed = parse_list(&reply, MIN_CAPTION_CHARS);
    info!("Parsed {} of {} captions from the model", parsed.len().min(count), count);
    fill_to_count(parsed, &short_captions(description), count, vary_caption)
}

fn prompt_instructions(description: &str, count: usize) -> String {
    format!(
        r#"You are the creative director of an advertising agency. The product is: "{description}"

Write {count} distinct background scene prompts for Stable Diffusion. Each prompt must:
1. Describe a different environment suited to showcasing this product
2. Be vivid and specific, e.g. "A sunlit modern kitchen with marble countertops and natural light"
3. Leave out the product itself and any text or logos
4. Focus on atmosphere, mood and setting
5. Leave room for a product to be placed in the foreground

Reply with a numbered list of exactly {count} prompts, one per line, and nothing else.
Example:
1. A minimalist white studio with soft natural lighting
2. A vibrant urban street scene at golden hour
3. A luxurious spa with marble surfaces and plants
"#
    )
}

fn caption_instructions(description: &str, count: usize) -> String {
    format!(
        r#"You are a copywriter for social media advertising. The product is: "{description}"

Write {count} catchy captions for Instagram or Facebook ads. Each caption must:
1. Stay under 100 characters
2. Grab attention
3. Include 2-3 relevant hashtags
4. Highlight a key benefit or feature

Reply with a numbered list of exactly {count} captions, one per line, and nothing else.
Example:
1. Transform your space with premium quality! #PremiumDesign #HomeDecor
2. Elevate your lifestyle today. #ModernLiving #QualityFirst
"#
    )
}

fn failure_prompts(description: &str) -> Vec<String> {
    vec![
        format!("A modern minimalist studio with soft lighting, perfect for showcasing {description}"),
        format!("A vibrant contemporary setting with natural elements, ideal for {description}"),
        format!("A luxurious elegant environment with sophisticated lighting, showcasing {description}"),
        format!("A dynamic urban backdrop with modern aesthetics, featuring {description}"),
        format!("A serene natural setting with professional lighting, highlighting {description}"),
    ]
}

fn short_prompts(description: &str) -> Vec<String> {
    vec![
        format!("A professional setting showcasing {description}"),
        format!("A modern environment featuring {description}"),
        format!("An elegant backdrop for {description}"),
    ]
}

fn failure_captions(description: &str) -> Vec<String> {
    vec![
        format!("Discover {description}! #Quality #Innovation"),
        format!("Elevate your experience with {description}. #Premium #Style"),
        format!("Transform your world. {description} #Modern #Design"),
        format!("Experience the difference. {description} #Excellence #Luxury"),
        format!("Your new favorite. {description} #Trending #MustHave"),
    ]
}

fn short_captions(description: &str) -> Vec<String> {
    vec![
        format!("Discover {description}! #Quality #Innovation"),
        format!("Elevate your experience. {description} #Premium #Style"),
    ]
}

fn vary_prompt(prompt: &str, round: usize) -> String {
    format!("{prompt}, variation {round}")
}

fn vary_caption(caption: &str, _round: usize) -> String {
    caption.replace('#', "#New")
}
