//! Canned Search Knowledge
//!
//! Keyword → fact table behind the simulated web search. Order is fixed
//! and is the order results are reported in.

pub const KNOWLEDGE: &[(&str, &str)] = &[
    ("weather", "The current weather is sunny with a high of 75°F."),
    ("news", "Latest headlines: Tech stocks rise, new climate policy announced, sports team wins championship."),
    ("recipe", "Popular recipes: pasta carbonara, chicken curry, chocolate cake."),
    ("math", "Math concepts: algebra, calculus, statistics, geometry."),
    ("computer", "Computer science topics: programming, algorithms, data structures, artificial intelligence."),
    ("ai", "AI development is advancing rapidly with new models being released regularly."),
    ("docker", "Docker is a platform for developing, shipping, and running applications in containers."),
    ("python", "Python is a popular programming language known for its readability and versatility. It's widely used for web development, data science, machine learning, and automation. Python has a simple syntax that makes it easy to learn, and it has a large ecosystem of libraries and frameworks."),
    ("movies", "Recent popular movies include action, drama, and comedy genres."),
    ("books", "Bestselling books span fiction, non-fiction, self-help, and fantasy categories."),
    ("programming", "Programming is the process of creating software using programming languages. Popular languages include Python, JavaScript, Java, C++, and many others."),
    ("data science", "Data science combines statistics, programming, and domain knowledge to extract insights from data. It often uses Python and R languages."),
    ("web development", "Web development involves creating websites and web applications. It typically uses HTML, CSS, JavaScript, and various frameworks and libraries."),
    ("artificial intelligence", "Artificial intelligence involves creating systems that can perform tasks that typically require human intelligence. This includes machine learning, natural language processing, and computer vision."),
    ("machine learning", "Machine learning is a subset of AI that involves training systems to learn from data and make predictions or decisions without being explicitly programmed."),
    ("containerization", "Containerization is a technology for packaging and running applications and their dependencies in isolated environments called containers."),
];

/// Every entry whose keyword occurs in the (already lowercased) query
pub fn matching(query: &str) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
    KNOWLEDGE
        .iter()
        .copied()
        .filter(move |(keyword, _)| query.contains(keyword))
}

/// Fact for an exact keyword
pub fn fact(keyword: &str) -> Option<&'static str> {
    KNOWLEDGE
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, fact)| *fact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_unique_and_lowercase() {
        for (i, (keyword, _)) in KNOWLEDGE.iter().enumerate() {
            assert_eq!(*keyword, keyword.to_lowercase());
            assert!(KNOWLEDGE[i + 1..].iter().all(|(k, _)| k != keyword));
        }
    }

    #[test]
    fn test_matching_keeps_table_order() {
        let keys: Vec<_> = matching("machine learning with python").map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["python", "machine learning"]);
    }

    #[test]
    fn test_fact_lookup() {
        assert!(fact("docker").unwrap().starts_with("Docker is a platform"));
        assert!(fact("rust").is_none());
    }
}
