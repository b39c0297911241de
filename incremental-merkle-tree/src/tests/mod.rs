mod test_append;
